use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::config::settings::ApplicationSettings;
use crate::db::invitations;
use crate::errors::ApiError;
use crate::models::invitation::{CreatedInvitation, InvitationStatus, InvitationView};
use crate::models::user::CurrentUser;
use crate::utils::text::generate_invitation_token;

pub const INVITATION_VALID_DAYS: i64 = 30;

pub fn invitation_link(frontend_url: &str, token: &str) -> String {
    format!("{}/register?token={}", frontend_url.trim_end_matches('/'), token)
}

#[tracing::instrument(name = "Create invitation", skip(pool, settings), fields(created_by = %admin.username))]
pub async fn create_invitation(
    admin: CurrentUser,
    pool: web::Data<PgPool>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, ApiError> {
    let token = generate_invitation_token();
    let fecha_expiracion = Utc::now() + Duration::days(INVITATION_VALID_DAYS);

    let created = invitations::insert_token(&pool, &token, admin.id_usuario, fecha_expiracion).await?;

    tracing::info!("Invitation {} created, expires {}", created.id_token, created.fecha_expiracion);
    Ok(HttpResponse::Created().json(CreatedInvitation {
        message: "Token de invitación creado exitosamente".into(),
        invitation_link: invitation_link(&settings.frontend_url, &created.token),
        token: created.token,
        fecha_expiracion: created.fecha_expiracion,
    }))
}

/// Public check used by the registration page before showing the form.
#[tracing::instrument(name = "Validate invitation", skip(path, pool))]
pub async fn validate_invitation(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let invitation = match invitations::find_token(&pool, &path.into_inner()).await? {
        Some(invitation) => invitation,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "valido": false,
                "mensaje": "Token de invitación no válido"
            })))
        }
    };

    let response = match invitation.status_at(Utc::now()) {
        InvitationStatus::Usado => HttpResponse::BadRequest().json(json!({
            "valido": false,
            "mensaje": "Este token de invitación ya fue utilizado"
        })),
        InvitationStatus::Expirado => HttpResponse::BadRequest().json(json!({
            "valido": false,
            "mensaje": "Este token de invitación ha expirado"
        })),
        InvitationStatus::Activo => HttpResponse::Ok().json(json!({
            "valido": true,
            "mensaje": "Token válido",
            "fechaExpiracion": invitation.fecha_expiracion
        })),
    };
    Ok(response)
}

#[tracing::instrument(name = "List invitations", skip(pool, settings))]
pub async fn list_invitations(
    pool: web::Data<PgPool>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let tokens: Vec<InvitationView> = invitations::list_tokens(&pool)
        .await?
        .into_iter()
        .map(|fila| InvitationView {
            estado: InvitationStatus::of(fila.usado, fila.fecha_expiracion, now),
            invitation_link: invitation_link(&settings.frontend_url, &fila.token),
            fila,
        })
        .collect();

    Ok(HttpResponse::Ok().json(tokens))
}

#[tracing::instrument(name = "Delete invitation", skip(pool))]
pub async fn delete_invitation(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_token = path.into_inner();
    if !invitations::delete_token(&pool, id_token).await? {
        return Err(ApiError::not_found("Token no encontrado"));
    }

    tracing::info!("Invitation {} deleted", id_token);
    Ok(HttpResponse::Ok().json(json!({ "message": "Token eliminado exitosamente" })))
}
