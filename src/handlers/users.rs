// src/handlers/users.rs
use axum::{extract::State, Json};
use sqlx::PgPool;

use crate::auth::{create_jwt, hash_password, verify_password, AuthUser};
use crate::db::UserRepo;
use crate::error::StoreContext;
use crate::models::user::{
    AuthResponse, ChangePasswordSchema, LoginSchema, UpdateAppearanceSchema, UpdateGeneralSchema,
    UpdateNotificationsSchema, UpdateProfileSchema, User, UserSettings,
};
use crate::models::MessageResponse;
use crate::validation::{IdParam, ValidatedJson};
use crate::{AppError, AppState};

pub const DEFAULT_ADMIN_NAME: &str = "Admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@gestionpro.fr";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password123";
const DEFAULT_ADMIN_ROLE: &str = "admin";

const LOAD_FAILED: &str = "Erreur lors de la récupération de l'utilisateur";
const SAVE_FAILED: &str = "Erreur lors de la mise à jour des paramètres";

fn not_found() -> AppError {
    AppError::NotFound("Utilisateur introuvable".into())
}

/// The built-in admin account, created on first use.
pub(crate) async fn default_user(db: &PgPool) -> Result<User, AppError> {
    if let Some(user) = UserRepo::find_by_email(db, DEFAULT_ADMIN_EMAIL)
        .await
        .context(LOAD_FAILED)?
    {
        return Ok(user);
    }

    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD)?;
    let user = UserRepo::insert_or_get(
        db,
        DEFAULT_ADMIN_NAME,
        DEFAULT_ADMIN_EMAIL,
        &password_hash,
        DEFAULT_ADMIN_ROLE,
    )
    .await
    .context(LOAD_FAILED)?;
    tracing::info!(user_id = user.id, "default admin account created");
    Ok(user)
}

// --- 1. 登录 (POST /auth/login) ---
pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginSchema>,
) -> Result<Json<AuthResponse>, AppError> {
    default_user(&state.db).await?;

    let user = UserRepo::find_by_email(&state.db, &payload.email)
        .await
        .context(LOAD_FAILED)?
        .ok_or_else(|| AppError::Auth("Email ou mot de passe incorrect".into()))?;

    if !verify_password(&payload.password, &user.password) {
        return Err(AppError::Auth("Email ou mot de passe incorrect".into()));
    }

    let token = create_jwt(&state.config.jwt_secret, user.id, &user.email)?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(AuthResponse { token, user }))
}

// --- 2. 当前用户 (GET /user/current) ---
// 有合法 token 就用 token 里的用户，否则用默认管理员
pub async fn get_current_user_handler(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    if let Some(auth) = auth {
        if let Some(user) = UserRepo::find_by_id(&state.db, auth.id)
            .await
            .context(LOAD_FAILED)?
        {
            return Ok(Json(user));
        }
    }
    Ok(Json(default_user(&state.db).await?))
}

// --- 3. 设置总览 (GET /user/:id/settings) ---
pub async fn get_user_settings_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
) -> Result<Json<UserSettings>, AppError> {
    let user = UserRepo::find_by_id(&state.db, id)
        .await
        .context(LOAD_FAILED)?
        .ok_or_else(not_found)?;
    Ok(Json(UserSettings::from(&user)))
}

// --- 4. 各设置分组，分别保存 ---

pub async fn update_profile_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateProfileSchema>,
) -> Result<Json<User>, AppError> {
    let user = UserRepo::update_profile(&state.db, id, &body)
        .await
        .context("Erreur lors de la mise à jour du profil")?
        .ok_or_else(not_found)?;
    Ok(Json(user))
}

pub async fn update_notifications_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateNotificationsSchema>,
) -> Result<Json<User>, AppError> {
    let user = UserRepo::update_notifications(&state.db, id, &body)
        .await
        .context("Erreur lors de la mise à jour des notifications")?
        .ok_or_else(not_found)?;
    Ok(Json(user))
}

pub async fn update_password_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<ChangePasswordSchema>,
) -> Result<Json<MessageResponse>, AppError> {
    const FAILED: &str = "Erreur lors du changement de mot de passe";

    let user = UserRepo::find_by_id(&state.db, id)
        .await
        .context(FAILED)?
        .ok_or_else(not_found)?;

    if !verify_password(&body.current_password, &user.password) {
        return Err(AppError::Auth("Mot de passe actuel incorrect".into()));
    }

    let password_hash = hash_password(&body.new_password)?;
    if !UserRepo::update_password(&state.db, id, &password_hash)
        .await
        .context(FAILED)?
    {
        return Err(not_found());
    }
    tracing::info!(user_id = id, "password changed");

    Ok(Json(MessageResponse {
        message: "Mot de passe mis à jour",
    }))
}

pub async fn update_appearance_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateAppearanceSchema>,
) -> Result<Json<User>, AppError> {
    let user = UserRepo::update_appearance(&state.db, id, &body)
        .await
        .context("Erreur lors de la mise à jour de l'apparence")?
        .ok_or_else(not_found)?;
    Ok(Json(user))
}

pub async fn update_general_handler(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    ValidatedJson(body): ValidatedJson<UpdateGeneralSchema>,
) -> Result<Json<User>, AppError> {
    let user = UserRepo::update_general(&state.db, id, &body)
        .await
        .context(SAVE_FAILED)?
        .ok_or_else(not_found)?;
    Ok(Json(user))
}
