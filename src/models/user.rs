// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::domain::coerce::nullable;
use crate::domain::theme::{Palette, PrimaryColor, Theme};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub phone: Option<String>,
    pub role: String,
    pub theme: String,
    pub primary_color: String,
    pub language: String,
    pub timezone: String,
    pub email_notifications: bool,
    pub project_notifications: bool,
    pub task_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn wants_task_mail(&self) -> bool {
        self.email_notifications && self.task_notifications
    }

    pub fn wants_project_mail(&self) -> bool {
        self.email_notifications && self.project_notifications
    }
}

// --- Settings document ---

#[derive(Debug, Serialize)]
pub struct UserSettings {
    pub profile: ProfileSettings,
    pub notifications: NotificationSettings,
    pub appearance: AppearanceSettings,
    pub general: GeneralSettings,
}

#[derive(Debug, Serialize)]
pub struct ProfileSettings {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub project_notifications: bool,
    pub task_notifications: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceSettings {
    pub theme: String,
    pub primary_color: String,
    pub palette: Palette,
}

#[derive(Debug, Serialize)]
pub struct GeneralSettings {
    pub language: String,
    pub timezone: String,
}

impl From<&User> for UserSettings {
    fn from(user: &User) -> Self {
        UserSettings {
            profile: ProfileSettings {
                name: user.name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
            },
            notifications: NotificationSettings {
                email_notifications: user.email_notifications,
                project_notifications: user.project_notifications,
                task_notifications: user.task_notifications,
            },
            appearance: AppearanceSettings {
                theme: user.theme.clone(),
                primary_color: user.primary_color.clone(),
                palette: Palette::from_stored(&user.theme, &user.primary_color),
            },
            general: GeneralSettings {
                language: user.language.clone(),
                timezone: user.timezone.clone(),
            },
        }
    }
}

// --- Request bodies, one per settings group ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileSchema {
    #[validate(length(min = 1, max = 100, message = "Le nom ne peut pas être vide"))]
    pub name: Option<String>,
    #[validate(email(message = "Adresse email invalide"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationsSchema {
    pub email_notifications: Option<bool>,
    pub project_notifications: Option<bool>,
    pub task_notifications: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordSchema {
    pub current_password: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Les mots de passe ne correspondent pas"))]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppearanceSchema {
    pub theme: Option<Theme>,
    pub primary_color: Option<PrimaryColor>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGeneralSchema {
    #[validate(length(min = 1, max = 50))]
    pub language: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub timezone: Option<String>,
}

// --- Authentication ---

#[derive(Debug, Deserialize, Validate)]
pub struct LoginSchema {
    #[validate(email(message = "Adresse email invalide"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> User {
        let now = Utc::now();
        User {
            id: 1,
            name: "Admin".into(),
            email: "admin@gestionpro.fr".into(),
            password: "$argon2id$secret".into(),
            phone: None,
            role: "admin".into(),
            theme: "Sombre".into(),
            primary_color: "green".into(),
            language: "Français".into(),
            timezone: "Europe/Paris".into(),
            email_notifications: true,
            project_notifications: false,
            task_notifications: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn password_is_never_serialized() {
        let json = serde_json::to_value(admin()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["primaryColor"], "green");
        assert_eq!(json["emailNotifications"], true);
    }

    #[test]
    fn notification_gates_need_email_enabled() {
        let mut user = admin();
        assert!(user.wants_task_mail());
        assert!(!user.wants_project_mail());

        user.email_notifications = false;
        assert!(!user.wants_task_mail());
    }

    #[test]
    fn settings_carry_resolved_palette() {
        let settings = serde_json::to_value(UserSettings::from(&admin())).unwrap();
        assert_eq!(settings["appearance"]["palette"]["primary"], "#10b981");
        assert_eq!(settings["appearance"]["palette"]["dark"], true);
        assert_eq!(settings["notifications"]["projectNotifications"], false);
    }

    #[test]
    fn password_change_rules() {
        let short = ChangePasswordSchema {
            current_password: "password123".into(),
            new_password: "abc".into(),
            confirm_password: "abc".into(),
        };
        assert!(short.validate().is_err());

        let mismatch = ChangePasswordSchema {
            current_password: "password123".into(),
            new_password: "abcdef".into(),
            confirm_password: "abcdeg".into(),
        };
        assert!(mismatch.validate().is_err());

        let ok = ChangePasswordSchema {
            current_password: "password123".into(),
            new_password: "abcdef".into(),
            confirm_password: "abcdef".into(),
        };
        assert!(ok.validate().is_ok());
    }
}
