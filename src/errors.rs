//! Error type shared by every handler.
//!
//! Handlers return `Result<HttpResponse, ApiError>`; actix turns the error into a JSON body of the
//! shape `{"success": false, "error": "...", "message": "..."}` with the matching status code.
//! Database and settlement failures also carry `timestamp` and, outside production, a `detalle`
//! field with the driver message.

use std::sync::OnceLock;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use chrono::Utc;
use serde_json::json;

use crate::betting::settlement::SettlementError;

static EXPOSE_ERROR_DETAILS: OnceLock<bool> = OnceLock::new();

/// Decide once per process whether driver messages reach the client.
pub fn set_expose_error_details(expose: bool) {
    let _ = EXPOSE_ERROR_DETAILS.set(expose);
}

fn expose_error_details() -> bool {
    *EXPOSE_ERROR_DETAILS.get().unwrap_or(&false)
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("La liquidación de apuestas falló")]
    Settlement(#[from] SettlementError),
    #[error("Error interno del servidor")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    /// Reports the first failing field, alphabetically, using the message set on the rule.
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by_key(|(field, _)| **field);

        let message = fields
            .into_iter()
            .find_map(|(field, errors)| {
                errors.first().map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("El campo {} no es válido", field),
                })
            })
            .unwrap_or_else(|| "Datos inválidos".to_string());

        ApiError::Validation(message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Settlement(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = self.to_string();
        let mut body = json!({
            "success": false,
            "error": message,
            "message": message,
        });

        match self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                body["timestamp"] = json!(Utc::now());
                if expose_error_details() {
                    body["detalle"] = json!(e.to_string());
                }
            }
            ApiError::Settlement(e) => {
                tracing::error!("Settlement failed: {}", e);
                body["codigo"] = json!("SETTLEMENT_FAILED");
                body["timestamp"] = json!(Utc::now());
                if expose_error_details() {
                    body["detalle"] = json!(e.to_string());
                }
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Cuerpo JSON inválido: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Parámetro de ruta inválido: {}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Parámetros de consulta inválidos: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(ApiError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_keep_the_rule_message() {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("length");
        error.message = Some("Username debe tener entre 3 y 50 caracteres".into());
        errors.add("username", error);

        let err = ApiError::from(errors);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Username debe tener entre 3 y 50 caracteres");
    }

    #[test]
    fn settlement_failures_are_distinct_from_database_errors() {
        let err = ApiError::from(SettlementError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Settlement(_)));
    }
}
