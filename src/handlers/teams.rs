use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::db::helpers::{conflict_on_unique, ensure_not_exists, ensure_unused, require_record};
use crate::db::teams;
use crate::errors::ApiError;
use crate::league::validation::LeagueValidator;
use crate::models::team::TeamRequest;

const DUPLICATE_NAME: &str = "Ya existe un equipo con ese nombre";
const NOT_FOUND: &str = "Equipo no encontrado";

#[tracing::instrument(name = "List teams", skip(pool))]
pub async fn list_teams(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let equipos = teams::list_teams(&pool).await?;
    Ok(HttpResponse::Ok().json(equipos))
}

#[tracing::instrument(name = "Get team", skip(pool))]
pub async fn get_team(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let equipo = require_record(teams::find_team(&pool, path.into_inner()).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(equipo))
}

#[tracing::instrument(
    name = "Create team",
    skip(body, pool),
    fields(nombre = ?body.nombre)
)]
pub async fn create_team(
    body: web::Json<TeamRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let input = LeagueValidator::new().validate_team(&body, Utc::now().date_naive())?;

    ensure_not_exists(
        teams::find_team_id_by_name(&pool, &input.nombre, None).await,
        DUPLICATE_NAME,
    )?;

    let team_id_fbr = format!("custom_{}", Utc::now().timestamp_millis());
    let equipo = teams::insert_team(&pool, &team_id_fbr, &input)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

    tracing::info!("Team {} created with id {}", equipo.nombre, equipo.id_equipo);
    Ok(HttpResponse::Created().json(json!({
        "message": "Equipo creado exitosamente",
        "equipo": equipo
    })))
}

#[tracing::instrument(name = "Update team", skip(body, pool))]
pub async fn update_team(
    path: web::Path<i32>,
    body: web::Json<TeamRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_equipo = path.into_inner();
    let input = LeagueValidator::new().validate_team(&body, Utc::now().date_naive())?;

    require_record(teams::find_team(&pool, id_equipo).await, NOT_FOUND)?;
    ensure_not_exists(
        teams::find_team_id_by_name(&pool, &input.nombre, Some(id_equipo)).await,
        "Ya existe otro equipo con ese nombre",
    )?;

    let equipo = teams::update_team(&pool, id_equipo, &input)
        .await
        .map_err(|e| conflict_on_unique(e, "Ya existe otro equipo con ese nombre"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Equipo actualizado exitosamente",
        "equipo": equipo
    })))
}

#[tracing::instrument(name = "Delete team", skip(pool))]
pub async fn delete_team(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_equipo = path.into_inner();
    require_record(teams::find_team(&pool, id_equipo).await, NOT_FOUND)?;

    const IN_USE: &str = "No se puede eliminar el equipo porque tiene partidos registrados";
    ensure_unused(teams::count_team_matches(&pool, id_equipo).await, IN_USE)?;

    if !teams::delete_team(&pool, id_equipo)
        .await
        .map_err(|e| conflict_on_unique(e, IN_USE))?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("Team {} deleted", id_equipo);
    Ok(HttpResponse::Ok().json(json!({ "message": "Equipo eliminado exitosamente" })))
}
