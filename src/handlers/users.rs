use actix_web::{web, HttpResponse};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use validator::Validate;

use crate::db::helpers::{conflict_on_unique, ensure_unused, require_record};
use crate::db::users;
use crate::errors::ApiError;
use crate::handlers::auth::hash;
use crate::models::common::ApiResponse;
use crate::models::user::{CreateUserRequest, CurrentUser, NewUser, UserProfile};

const NOT_FOUND: &str = "Usuario no encontrado";

#[tracing::instrument(name = "List users", skip(pool))]
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let usuarios = users::list_profiles(&pool).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Usuarios obtenidos exitosamente", usuarios)))
}

#[tracing::instrument(name = "Get user", skip(pool))]
pub async fn get_user(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let usuario = require_record(users::find_profile(&pool, path.into_inner()).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Usuario obtenido exitosamente", usuario)))
}

#[tracing::instrument(
    name = "Create user",
    skip(body, pool, admin),
    fields(username = %body.username, created_by = %admin.username)
)]
pub async fn create_user(
    admin: CurrentUser,
    body: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let mut request = body.into_inner();
    request.normalize();
    request.validate()?;

    let taken = "El username o email ya está registrado";
    if users::username_or_email_taken(&pool, &request.username, request.email.as_deref()).await? {
        return Err(ApiError::conflict(taken));
    }

    let password = request.take_password();
    let password_hash = hash(password.expose_secret())?;
    let nombre_completo = request
        .nombre_completo
        .clone()
        .unwrap_or_else(|| request.username.clone());

    let mut conn = pool.acquire().await?;
    let usuario = users::insert_user(
        &mut conn,
        &NewUser {
            username: &request.username,
            email: request.email.as_deref(),
            password_hash: &password_hash,
            nombre_completo: &nombre_completo,
            role: request.role(),
            puede_apostar: request.puede_apostar(),
        },
    )
    .await
    .map_err(|e| conflict_on_unique(e, taken))?;

    tracing::info!("User {} created as {}", usuario.username, usuario.role);
    Ok(HttpResponse::Created().json(ApiResponse::success("Usuario creado exitosamente", usuario)))
}

#[tracing::instrument(name = "Toggle user active flag", skip(pool, admin))]
pub async fn toggle_active(
    admin: CurrentUser,
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_usuario = path.into_inner();
    if id_usuario == admin.id_usuario {
        return Err(ApiError::validation("No puedes desactivar tu propio usuario"));
    }

    let usuario: UserProfile =
        require_record(users::toggle_active(&pool, id_usuario).await, NOT_FOUND)?;
    let message = if usuario.activo {
        "Usuario activado exitosamente"
    } else {
        "Usuario desactivado exitosamente"
    };

    tracing::info!("User {} active = {}", usuario.username, usuario.activo);
    Ok(HttpResponse::Ok().json(ApiResponse::success(message, usuario)))
}

#[tracing::instrument(name = "Delete user", skip(pool, admin))]
pub async fn delete_user(
    admin: CurrentUser,
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_usuario = path.into_inner();
    if id_usuario == admin.id_usuario {
        return Err(ApiError::validation("No puedes eliminar tu propio usuario"));
    }

    require_record(users::find_profile(&pool, id_usuario).await, NOT_FOUND)?;

    let in_use =
        "No se puede eliminar el usuario porque tiene registros asociados (apuestas, puntos, etc.)";
    ensure_unused(users::count_user_references(&pool, id_usuario).await, in_use)?;

    if !users::delete_user(&pool, id_usuario)
        .await
        .map_err(|e| conflict_on_unique(e, in_use))?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("User {} deleted", id_usuario);
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_message("Usuario eliminado exitosamente")))
}
