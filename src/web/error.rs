use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Canonical JSON body for error responses: `{ "erro": <mensagem> }`.
#[derive(Debug, Serialize, Clone)]
pub struct ErroBody {
    pub erro: String,
}

/// Request-level failure taxonomy. Every handler converts its failures into
/// one of these; nothing bubbles past the route layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Uniqueness violations answer 400 on this wire, not 409.
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErroBody {
            erro: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Logs the underlying failure and returns an [`ApiError::Internal`] with a
/// route-specific user-facing message.
pub fn internal<E: std::fmt::Debug>(message: &'static str) -> impl FnOnce(E) -> ApiError {
    move |err| {
        error!(?err, "{message}");
        ApiError::Internal(message.to_string())
    }
}

/// True when the database refused an insert because of a unique index.
pub fn violacao_de_unicidade(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_por_variante() {
        assert_eq!(
            ApiError::validation("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthenticated("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn corpo_carrega_a_mensagem() {
        let err = ApiError::validation("Nome é obrigatório");
        assert_eq!(err.to_string(), "Nome é obrigatório");
    }
}
