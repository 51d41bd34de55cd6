// src/lib.rs
use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod outlook;
pub mod validation;

pub use error::AppError;

use config::Config;
use handlers::*;
use notify::Mailer;
use outlook::OutlookClient;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    /// `None` when SMTP is not configured.
    pub mailer: Option<Arc<Mailer>>,
    pub outlook: OutlookClient,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let mailer = config.mail.clone().map(|mail| Arc::new(Mailer::new(mail)));
        let outlook = OutlookClient::new(config.graph_base_url.clone());
        Self {
            db,
            config: Arc::new(config),
            mailer,
            outlook,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/stats", get(get_stats_handler))
        // 认证 / 用户
        .route("/api/auth/login", post(login_handler))
        .route("/api/user/current", get(get_current_user_handler))
        .route("/api/user/:id/settings", get(get_user_settings_handler))
        .route("/api/user/:id/profile", patch(update_profile_handler))
        .route("/api/user/:id/notifications", patch(update_notifications_handler))
        .route("/api/user/:id/password", patch(update_password_handler))
        .route("/api/user/:id/appearance", patch(update_appearance_handler))
        .route("/api/user/:id/general", patch(update_general_handler))
        // 项目
        .route("/api/projects", get(get_projects_handler))
        .route("/api/projects", post(create_project_handler))
        .route("/api/projects/:id", patch(update_project_handler))
        .route("/api/projects/:id", delete(delete_project_handler))
        // 客户
        .route("/api/clients", get(get_clients_handler))
        .route("/api/clients", post(create_client_handler))
        .route("/api/clients/:id", patch(update_client_handler))
        .route("/api/clients/:id", delete(delete_client_handler))
        // 供应商
        .route("/api/suppliers", get(get_suppliers_handler))
        .route("/api/suppliers", post(create_supplier_handler))
        .route("/api/suppliers/:id", patch(update_supplier_handler))
        .route("/api/suppliers/:id", delete(delete_supplier_handler))
        // 任务
        .route("/api/tasks", get(get_tasks_handler))
        .route("/api/tasks", post(create_task_handler))
        .route("/api/tasks/:id", patch(update_task_handler))
        .route("/api/tasks/:id", delete(delete_task_handler))
        // 日历
        .route("/api/calendar", get(get_calendar_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}
