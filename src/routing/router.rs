//! Route table and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Normalize request paths against configured base paths
//! - Look up the first route matching method + path
//! - Invoke the matched action with the dispatch context
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - O(n) scan in registration order; first match wins
//! - Method comparison is case-insensitive
//! - Explicit not-found response rather than an error
//! - Action failures propagate to the caller untouched

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use bytes::Bytes;
use thiserror::Error;

use crate::config::RoutingConfig;
use crate::http::response::ApiResponse;
use crate::observability::metrics;
use crate::routing::controller::{ActionRequest, ActionResult, Controller, PathParams};
use crate::routing::template::{RouteTemplate, TemplateError, TemplateMode};

/// Error raised while building the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("{controller}::{action}: malformed route {method} {source}")]
    MalformedTemplate {
        controller: &'static str,
        action: &'static str,
        method: Method,
        #[source]
        source: TemplateError,
    },
}

type Invoker<C> = Arc<dyn Fn(&C, &ActionRequest) -> ActionResult + Send + Sync>;

/// A compiled route record.
struct Route<C> {
    method: Method,
    template: RouteTemplate,
    controller: &'static str,
    action: &'static str,
    invoke: Invoker<C>,
}

impl<C> Clone for Route<C> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            template: self.template.clone(),
            controller: self.controller,
            action: self.action,
            invoke: Arc::clone(&self.invoke),
        }
    }
}

/// Read-only view of a registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo<'r> {
    pub method: &'r Method,
    pub template: &'r str,
    pub controller: &'static str,
    pub action: &'static str,
}

/// The route selected for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'r> {
    pub controller: &'static str,
    pub action: &'static str,
    pub template: &'r str,
    pub params: PathParams,
    index: usize,
}

/// Ordered route table over dispatch context `C`.
pub struct Router<C> {
    routes: Vec<Route<C>>,
    base_paths: Vec<String>,
    mode: TemplateMode,
}

impl<C> Clone for Router<C> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            base_paths: self.base_paths.clone(),
            mode: self.mode,
        }
    }
}

impl<C: 'static> fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes().collect::<Vec<_>>())
            .field("base_paths", &self.base_paths)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<C: 'static> Router<C> {
    /// Create an empty router that strips `base_paths` (tried in order).
    pub fn new(base_paths: Vec<String>) -> Self {
        Self {
            routes: Vec::new(),
            base_paths,
            mode: TemplateMode::Strict,
        }
    }

    /// Create an empty router from configuration.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let mode = if config.strict_templates {
            TemplateMode::Strict
        } else {
            TemplateMode::Lenient
        };
        Self::new(config.base_paths.clone()).with_template_mode(mode)
    }

    pub fn with_template_mode(mut self, mode: TemplateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append every route declared by `T`, in declaration order.
    ///
    /// Nothing is appended if any of `T`'s templates is malformed.
    pub fn register<T: Controller<C>>(&mut self) -> Result<&mut Self, RouteError> {
        let mut compiled = Vec::new();

        for decl in T::routes() {
            let template = RouteTemplate::compile(decl.path, self.mode).map_err(|source| {
                RouteError::MalformedTemplate {
                    controller: T::NAME,
                    action: decl.action,
                    method: decl.method.clone(),
                    source,
                }
            })?;

            let handler = decl.handler;
            let invoke: Invoker<C> =
                Arc::new(move |ctx: &C, req: &ActionRequest| handler(&T::from_context(ctx), req));

            tracing::debug!(
                method = %decl.method,
                template = %template.as_str(),
                controller = T::NAME,
                action = decl.action,
                "Route registered"
            );

            compiled.push(Route {
                method: decl.method,
                template,
                controller: T::NAME,
                action: decl.action,
                invoke,
            });
        }

        self.routes.extend(compiled);
        metrics::record_route_table(self.routes.len());
        Ok(self)
    }

    /// Strip the first matching base path and ensure a leading slash.
    pub fn normalize_path(&self, raw: &str) -> String {
        normalize_path(raw, &self.base_paths)
    }

    /// Find the first route matching `method` and the normalized `raw_path`.
    pub fn resolve(&self, raw_path: &str, method: &str) -> Option<RouteMatch<'_>> {
        let path = self.normalize_path(raw_path);

        self.routes.iter().enumerate().find_map(|(index, route)| {
            if !route.method.as_str().eq_ignore_ascii_case(method) {
                return None;
            }
            let params = route.template.captures(&path)?;
            Some(RouteMatch {
                controller: route.controller,
                action: route.action,
                template: route.template.as_str(),
                params,
                index,
            })
        })
    }

    /// Route a request and run the matched action.
    ///
    /// No match yields a 404 response, not an error. Errors from the action
    /// are returned as-is.
    pub fn dispatch(&self, raw_path: &str, method: &str, ctx: &C, body: Bytes) -> ActionResult {
        let start = Instant::now();

        let Some(matched) = self.resolve(raw_path, method) else {
            tracing::warn!(method = %method, path = %raw_path, "No route matched");
            metrics::record_dispatch(method, metrics::Outcome::NotFound, start);
            return Ok(ApiResponse::route_not_found());
        };

        tracing::debug!(
            method = %method,
            path = %raw_path,
            controller = matched.controller,
            action = matched.action,
            "Dispatching"
        );

        let route = &self.routes[matched.index];
        let request = ActionRequest::new(matched.params, body);
        let result = (route.invoke)(ctx, &request);

        let outcome = if result.is_ok() {
            metrics::Outcome::Matched
        } else {
            metrics::Outcome::Failed
        };
        metrics::record_dispatch(method, outcome, start);

        result
    }

    /// Registered routes in priority order.
    pub fn routes(&self) -> impl Iterator<Item = RouteInfo<'_>> {
        self.routes.iter().map(|r| RouteInfo {
            method: &r.method,
            template: r.template.as_str(),
            controller: r.controller,
            action: r.action,
        })
    }

    pub fn base_paths(&self) -> &[String] {
        &self.base_paths
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Normalize a raw request URI for matching.
///
/// Query and fragment are dropped. The first of `base_paths` that is a
/// literal prefix of the path is stripped and no further prefixes are tried.
/// A leading `/` is then added if missing, so a path equal to a base path
/// becomes `/`.
pub fn normalize_path<S: AsRef<str>>(raw: &str, base_paths: &[S]) -> String {
    let mut path = raw
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    for base in base_paths {
        if let Some(rest) = path.strip_prefix(base.as_ref()) {
            path = rest;
            break;
        }
    }

    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
