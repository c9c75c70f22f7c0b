//! Controller contract and route declarations.
//!
//! Controllers declare their routes statically: each [`RouteDecl`] pairs a
//! method and path template with a plain `fn` on the controller, so a
//! misspelled action is a compile error rather than a runtime miss.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::http::{Method, StatusCode};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::response::ApiResponse;

/// Outcome of a controller action.
pub type ActionResult = Result<ApiResponse, ControllerError>;

/// A controller action bound to its receiver type.
pub type Action<T> = fn(&T, &ActionRequest) -> ActionResult;

/// Failure raised by a controller action.
///
/// The router never catches these; the front controller maps them to
/// error responses.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ControllerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ControllerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ControllerError::NotFound(_) => StatusCode::NOT_FOUND,
            ControllerError::Conflict(_) => StatusCode::CONFLICT,
            ControllerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for ControllerError {
    fn from(e: serde_json::Error) -> Self {
        ControllerError::Internal(Box::new(e))
    }
}

/// A type that can be registered with the router.
///
/// `C` is the dispatch context forwarded unchanged into [`Controller::from_context`]
/// on every request.
pub trait Controller<C>: Sized + 'static {
    /// Name used in logs and route listings.
    const NAME: &'static str;

    /// Build the controller for one request.
    fn from_context(ctx: &C) -> Self;

    /// Route declarations, in priority order.
    fn routes() -> Vec<RouteDecl<Self>>;
}

/// One route declaration: method + path template → action.
pub struct RouteDecl<T> {
    pub method: Method,
    pub path: &'static str,
    pub action: &'static str,
    pub handler: Action<T>,
}

impl<T> RouteDecl<T> {
    pub fn new(method: Method, path: &'static str, action: &'static str, handler: Action<T>) -> Self {
        Self {
            method,
            path,
            action,
            handler,
        }
    }

    pub fn get(path: &'static str, action: &'static str, handler: Action<T>) -> Self {
        Self::new(Method::GET, path, action, handler)
    }

    pub fn post(path: &'static str, action: &'static str, handler: Action<T>) -> Self {
        Self::new(Method::POST, path, action, handler)
    }

    pub fn put(path: &'static str, action: &'static str, handler: Action<T>) -> Self {
        Self::new(Method::PUT, path, action, handler)
    }

    pub fn patch(path: &'static str, action: &'static str, handler: Action<T>) -> Self {
        Self::new(Method::PATCH, path, action, handler)
    }

    pub fn delete(path: &'static str, action: &'static str, handler: Action<T>) -> Self {
        Self::new(Method::DELETE, path, action, handler)
    }
}

/// Path parameters extracted from a matched route, name → raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(BTreeMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Everything an action receives besides its controller.
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    params: PathParams,
    body: Bytes,
}

impl ActionRequest {
    pub fn new(params: PathParams, body: Bytes) -> Self {
        Self { params, body }
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// A path parameter that the route template guarantees is present.
    pub fn param(&self, name: &str) -> Result<&str, ControllerError> {
        self.params
            .get(name)
            .ok_or_else(|| ControllerError::BadRequest(format!("Parâmetro ausente: {name}.")))
    }

    /// A path parameter coerced to `T`.
    pub fn param_as<T: FromStr>(&self, name: &str) -> Result<T, ControllerError> {
        self.param(name)?
            .parse()
            .map_err(|_| ControllerError::BadRequest(format!("Parâmetro inválido: {name}.")))
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the request body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ControllerError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ControllerError::BadRequest(format!("JSON inválido: {e}")))
    }
}
