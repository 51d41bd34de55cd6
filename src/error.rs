// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::coerce::CoerceError;

const GENERIC_STORE_MESSAGE: &str = "Quelque chose s'est mal passé!";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store failure with the route-specific message shown to the caller.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,

    #[error("Validation error: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(e) | AppError::Store { source: e, .. } => store_status(e),
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Database(e) => store_message(e, GENERIC_STORE_MESSAGE),
            AppError::Store { context, source } => store_message(source, context),
            AppError::Auth(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal => "Erreur interne du serveur".to_string(),
            AppError::ValidationError(e) => format!("Données invalides: {}", e),
        }
    }
}

fn store_status(e: &sqlx::Error) -> StatusCode {
    match e {
        sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
        sqlx::Error::Database(db) if db.is_unique_violation() => StatusCode::CONFLICT,
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_message(e: &sqlx::Error, fallback: &str) -> String {
    match e {
        sqlx::Error::RowNotFound => "Ressource introuvable".to_string(),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            "Cet enregistrement existe déjà".to_string()
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            "Référence vers un enregistrement inexistant".to_string()
        }
        _ => fallback.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

impl From<CoerceError> for AppError {
    fn from(err: CoerceError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Attaches the message a route reports when the store fails.
pub trait StoreContext<T> {
    fn context(self, context: &'static str) -> Result<T, AppError>;
}

impl<T> StoreContext<T> for Result<T, sqlx::Error> {
    fn context(self, context: &'static str) -> Result<T, AppError> {
        self.map_err(|source| AppError::Store { context, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn store_failure_reports_route_message() {
        let err: Result<(), _> = Err(sqlx::Error::PoolTimedOut);
        let err = err.context("Erreur lors de la création du projet").unwrap_err();

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Erreur lors de la création du projet");
    }

    #[tokio::test]
    async fn row_not_found_is_404() {
        let (status, body) = body_of(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Ressource introuvable");
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let (status, body) = body_of(AppError::BadRequest("clientId invalide".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "clientId invalide");
    }

    #[test]
    fn coerce_errors_become_bad_requests() {
        let err: AppError = CoerceError::InvalidId("clientId").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
