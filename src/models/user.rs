use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::common::deserialize_optional_bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Usuario,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Usuario => "usuario",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload. `sub` carries the numeric user id as a string.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// The caller of an authenticated request, loaded fresh from `usuarios` by the middleware.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CurrentUser {
    pub id_usuario: i32,
    pub username: String,
    pub role: Role,
    pub puede_apostar: bool,
    pub activo: bool,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Account as exposed over the API. The password hash never leaves the query layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id_usuario: i32,
    pub username: String,
    pub email: Option<String>,
    pub nombre_completo: Option<String>,
    pub role: Role,
    pub puede_apostar: bool,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub ultimo_acceso: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
pub struct UserCredentials {
    pub id_usuario: i32,
    pub password_hash: String,
    pub activo: bool,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// No `Debug`: the password is plain text until [`RegisterRequest::take_password`].
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username debe tener entre 3 y 50 caracteres"),
        custom = "validate_username_charset"
    )]
    pub username: String,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password debe tener al menos 6 caracteres"))]
    pub password: String,
    #[validate(length(max = 100, message = "Nombre completo no puede exceder 100 caracteres"))]
    pub nombre_completo: Option<String>,
    /// Invitation token from the registration link.
    pub token: Option<String>,
}

impl RegisterRequest {
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = normalize_optional(self.email.take()).map(|e| e.to_lowercase());
        self.nombre_completo = normalize_optional(self.nombre_completo.take());
        self.token = normalize_optional(self.token.take());
    }

    /// Moves the validated password out of the request.
    pub fn take_password(&mut self) -> SecretString {
        into_secret(&mut self.password)
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_secret_string")]
    pub password: Option<SecretString>,
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(deserialize_with = "deserialize_secret_string")]
    pub password_actual: SecretString,
    #[validate(length(min = 6, message = "Password debe tener al menos 6 caracteres"))]
    pub password_nueva: String,
}

impl ChangePasswordRequest {
    pub fn take_new_password(&mut self) -> SecretString {
        into_secret(&mut self.password_nueva)
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username debe tener entre 3 y 50 caracteres"),
        custom = "validate_username_charset"
    )]
    pub username: String,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password debe tener al menos 6 caracteres"))]
    pub password: String,
    #[validate(length(max = 100, message = "Nombre completo no puede exceder 100 caracteres"))]
    pub nombre_completo: Option<String>,
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub puede_apostar: Option<bool>,
}

impl CreateUserRequest {
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = normalize_optional(self.email.take()).map(|e| e.to_lowercase());
        self.nombre_completo = normalize_optional(self.nombre_completo.take());
    }

    /// Moves the validated password out of the request.
    pub fn take_password(&mut self) -> SecretString {
        into_secret(&mut self.password)
    }

    pub fn role(&self) -> Role {
        self.role.unwrap_or(Role::Usuario)
    }

    /// Regular users may bet unless told otherwise; admins only when asked to.
    pub fn puede_apostar(&self) -> bool {
        self.puede_apostar.unwrap_or(self.role() == Role::Usuario)
    }
}

/// Fields written by every account-creating path.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub nombre_completo: &'a str,
    pub role: Role,
    pub puede_apostar: bool,
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_username_charset(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        let mut error = ValidationError::new("username_charset");
        error.message = Some(Cow::from(
            "Username solo puede contener letras, números y guiones bajos",
        ));
        Err(error)
    }
}

/// Empties `plain` so the only copy left is the secret one.
fn into_secret(plain: &mut String) -> SecretString {
    SecretString::new(std::mem::take(plain).into_boxed_str())
}

pub fn deserialize_secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into_boxed_str()))
}

pub fn deserialize_optional_secret_string<'de, D>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty())
        .map(|s| SecretString::new(s.into_boxed_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn register(value: serde_json::Value) -> RegisterRequest {
        let mut request: RegisterRequest = serde_json::from_value(value).unwrap();
        request.normalize();
        request
    }

    #[test]
    fn valid_registration_passes() {
        let request = register(json!({
            "username": " liga_fan1 ",
            "email": "Fan@Example.com",
            "password": "secreto"
        }));
        assert!(request.validate().is_ok());
        assert_eq!(request.username, "liga_fan1");
        assert_eq!(request.email.as_deref(), Some("fan@example.com"));
    }

    #[test]
    fn username_rules_are_enforced() {
        let short = register(json!({"username": "ab", "password": "secreto"}));
        assert!(short.validate().is_err());

        let dashed = register(json!({"username": "liga-fan", "password": "secreto"}));
        let errors = dashed.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn short_passwords_and_bad_emails_are_rejected() {
        let request = register(json!({
            "username": "liga_fan",
            "email": "not-an-email",
            "password": "12345"
        }));
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn validated_password_moves_into_a_secret() {
        use secrecy::ExposeSecret;

        let mut request = register(json!({"username": "liga_fan", "password": "secreto"}));
        assert!(request.validate().is_ok());
        let password = request.take_password();
        assert_eq!(password.expose_secret(), "secreto");
        assert!(request.password.is_empty());
    }

    #[test]
    fn new_password_needs_six_characters() {
        let short: ChangePasswordRequest =
            serde_json::from_value(json!({"password_actual": "secreto", "password_nueva": "12345"}))
                .unwrap();
        let errors = short.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_nueva"));

        let mut ok: ChangePasswordRequest =
            serde_json::from_value(json!({"password_actual": "secreto", "password_nueva": "nuevo123"}))
                .unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(secrecy::ExposeSecret::expose_secret(&ok.take_new_password()), "nuevo123");
    }

    #[test]
    fn blank_email_is_treated_as_absent() {
        let request = register(json!({"username": "liga_fan", "email": "  ", "password": "secreto"}));
        assert_eq!(request.email, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn created_users_default_betting_permission_by_role() {
        let user: CreateUserRequest =
            serde_json::from_value(json!({"username": "u1", "password": "secreto"})).unwrap();
        assert_eq!(user.role(), Role::Usuario);
        assert!(user.puede_apostar());

        let admin: CreateUserRequest = serde_json::from_value(
            json!({"username": "a1", "password": "secreto", "role": "admin"}),
        )
        .unwrap();
        assert!(!admin.puede_apostar());
    }

    #[test]
    fn numeric_subject_is_the_user_id() {
        let claims = Claims {
            sub: "42".into(),
            username: "x".into(),
            role: Role::Usuario,
            exp: 0,
        };
        assert_eq!(claims.user_id(), Some(42));
    }
}
