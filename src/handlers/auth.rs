use actix_web::{web, HttpResponse};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::generate_token;
use crate::config::jwt::JwtSettings;
use crate::db::helpers::{conflict_on_unique, require_record};
use crate::db::{invitations, users};
use crate::errors::ApiError;
use crate::models::invitation::InvitationStatus;
use crate::models::user::{
    AuthResponse, ChangePasswordRequest, CurrentUser, LoginRequest, NewUser, RegisterRequest, Role,
    UserProfile,
};
use crate::utils::password::{hash_password, verify_password};

const TAKEN: &str = "El username o email ya está registrado";

#[tracing::instrument(
    name = "Register user",
    skip(body, pool, jwt_settings),
    fields(username = %body.username)
)]
pub async fn register(
    body: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, ApiError> {
    let mut request = body.into_inner();
    request.normalize();
    request.validate()?;

    if users::username_or_email_taken(&pool, &request.username, request.email.as_deref()).await? {
        return Err(ApiError::conflict(TAKEN));
    }

    let password = request.take_password();
    let password_hash = hash(password.expose_secret())?;

    let mut tx = pool.begin().await?;

    let invitation = match request.token.as_deref() {
        Some(token) => {
            let invitation = invitations::find_token_for_update(&mut tx, token)
                .await?
                .ok_or_else(|| ApiError::not_found("Token de invitación no válido"))?;
            match invitation.status_at(Utc::now()) {
                InvitationStatus::Usado => {
                    return Err(ApiError::validation("Este token de invitación ya fue utilizado"))
                }
                InvitationStatus::Expirado => {
                    return Err(ApiError::validation("Este token de invitación ha expirado"))
                }
                InvitationStatus::Activo => Some(invitation),
            }
        }
        None => None,
    };

    let nombre_completo = request
        .nombre_completo
        .clone()
        .unwrap_or_else(|| request.username.clone());
    let user = users::insert_user(
        &mut tx,
        &NewUser {
            username: &request.username,
            email: request.email.as_deref(),
            password_hash: &password_hash,
            nombre_completo: &nombre_completo,
            role: Role::Usuario,
            puede_apostar: true,
        },
    )
    .await
    .map_err(|e| conflict_on_unique(e, TAKEN))?;

    if let Some(invitation) = invitation {
        invitations::mark_used(&mut tx, invitation.id_token, user.id_usuario).await?;
    }
    tx.commit().await?;

    tracing::info!("User {} registered with id {}", user.username, user.id_usuario);
    let token = sign(&user, &jwt_settings)?;
    Ok(HttpResponse::Created().json(AuthResponse {
        message: "Usuario registrado exitosamente".into(),
        token,
        user,
    }))
}

#[tracing::instrument(name = "Login", skip(body, pool, jwt_settings), fields(username = ?body.username))]
pub async fn login(
    body: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_settings: web::Data<JwtSettings>,
) -> Result<HttpResponse, ApiError> {
    let username = body.username.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let (username, password) = match (username, body.password.as_ref()) {
        (Some(username), Some(password)) => (username, password),
        _ => return Err(ApiError::validation("Username y password son requeridos")),
    };

    let credentials = users::find_credentials_by_username(&pool, username)
        .await?
        .filter(|c| verify_password(password.expose_secret(), &c.password_hash))
        .ok_or_else(|| {
            tracing::warn!("Failed login for {}", username);
            ApiError::unauthorized("Credenciales inválidas")
        })?;

    if !credentials.activo {
        return Err(ApiError::forbidden("Usuario inactivo. Contacta al administrador."));
    }

    let user = require_record(
        users::touch_last_access(&pool, credentials.id_usuario).await,
        "Usuario no encontrado",
    )?;
    let token = sign(&user, &jwt_settings)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login exitoso".into(),
        token,
        user,
    }))
}

#[tracing::instrument(name = "Get profile", skip(pool), fields(username = %user.username))]
pub async fn profile(user: CurrentUser, pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let profile = require_record(
        users::find_profile(&pool, user.id_usuario).await,
        "Usuario no encontrado",
    )?;
    Ok(HttpResponse::Ok().json(json!({ "user": profile })))
}

#[tracing::instrument(name = "Change password", skip(body, pool), fields(username = %user.username))]
pub async fn change_password(
    user: CurrentUser,
    body: web::Json<ChangePasswordRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let mut request = body.into_inner();
    request.validate()?;
    let password_nueva = request.take_new_password();

    let credentials = require_record(
        users::find_credentials(&pool, user.id_usuario).await,
        "Usuario no encontrado",
    )?;
    if !verify_password(request.password_actual.expose_secret(), &credentials.password_hash) {
        return Err(ApiError::unauthorized("La contraseña actual es incorrecta"));
    }

    let password_hash = hash(password_nueva.expose_secret())?;
    users::update_password_hash(&pool, user.id_usuario, &password_hash).await?;

    tracing::info!("Password changed for {}", user.username);
    Ok(HttpResponse::Ok().json(json!({ "message": "Contraseña actualizada exitosamente" })))
}

pub(crate) fn hash(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

fn sign(user: &UserProfile, jwt_settings: &JwtSettings) -> Result<String, ApiError> {
    generate_token(user.id_usuario, &user.username, user.role, jwt_settings)
        .map_err(|e| ApiError::Internal(format!("Failed to sign token: {}", e)))
}
