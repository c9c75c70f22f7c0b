//! JSON response envelope.
//!
//! # Responsibilities
//! - Build the `{"status": "success", "data": ..}` envelope
//! - Build the `{"status": "error", "message": ..}` envelope
//! - Map controller failures to status codes
//!
//! # Design Decisions
//! - Internal error details are logged, never sent to the client
//! - The route-not-found body is a fixed, observable contract

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::routing::ControllerError;

/// Message sent when no route matches.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Rota não encontrada.";

const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor.";

/// A status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    body: Value,
}

impl ApiResponse {
    /// 200 with `data` wrapped in the success envelope.
    pub fn success<T: Serialize + ?Sized>(data: &T) -> Result<Self, serde_json::Error> {
        Self::with_data(StatusCode::OK, data)
    }

    /// 201 with `data` wrapped in the success envelope.
    pub fn created<T: Serialize + ?Sized>(data: &T) -> Result<Self, serde_json::Error> {
        Self::with_data(StatusCode::CREATED, data)
    }

    fn with_data<T: Serialize + ?Sized>(status: StatusCode, data: &T) -> Result<Self, serde_json::Error> {
        let data = serde_json::to_value(data)?;
        Ok(Self {
            status,
            body: json!({ "status": "success", "data": data }),
        })
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "status": "error", "message": message.into() }),
        }
    }

    pub fn route_not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND_MESSAGE)
    }

    /// Error envelope for a failed action.
    pub fn from_error(err: &ControllerError) -> Self {
        let message = match err {
            ControllerError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        };
        Self::error(err.status(), message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success(&vec![1, 2]).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &json!({"status": "success", "data": [1, 2]}));

        let response = ApiResponse::created(&json!({"id": 3})).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_not_found_contract() {
        let response = ApiResponse::route_not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.body(),
            &json!({"status": "error", "message": "Rota não encontrada."})
        );
    }

    #[test]
    fn test_error_mapping_hides_internal_details() {
        let err = ControllerError::Internal("disk on fire".into());
        let response = ApiResponse::from_error(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body()["message"], "Erro interno do servidor.");

        let err = ControllerError::Conflict("Livro já cadastrado.".into());
        let response = ApiResponse::from_error(&err);
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.body()["message"], "Livro já cadastrado.");
    }
}
