use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::db::helpers::{conflict_on_unique, ensure_not_exists, ensure_unused, require_record};
use crate::db::stadiums;
use crate::errors::ApiError;
use crate::league::validation::LeagueValidator;
use crate::models::stadium::StadiumRequest;

const NOT_FOUND: &str = "Estadio no encontrado";

#[tracing::instrument(name = "List stadiums", skip(pool))]
pub async fn list_stadiums(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(stadiums::list_stadiums(&pool).await?))
}

#[tracing::instrument(name = "Get stadium", skip(pool))]
pub async fn get_stadium(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let estadio = require_record(stadiums::find_stadium(&pool, path.into_inner()).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(estadio))
}

#[tracing::instrument(
    name = "Create stadium",
    skip(body, pool),
    fields(nombre = ?body.nombre)
)]
pub async fn create_stadium(
    body: web::Json<StadiumRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let input = LeagueValidator::new().validate_stadium(&body)?;
    let duplicate = "Ya existe un estadio con ese nombre";

    ensure_not_exists(
        stadiums::find_stadium_id_by_name(&pool, &input.nombre, None).await,
        duplicate,
    )?;

    let estadio = stadiums::insert_stadium(&pool, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?;

    tracing::info!("Stadium {} created with id {}", estadio.nombre, estadio.id_estadio);
    Ok(HttpResponse::Created().json(json!({
        "message": "Estadio creado exitosamente",
        "estadio": estadio
    })))
}

#[tracing::instrument(name = "Update stadium", skip(body, pool))]
pub async fn update_stadium(
    path: web::Path<i32>,
    body: web::Json<StadiumRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_estadio = path.into_inner();
    let input = LeagueValidator::new().validate_stadium(&body)?;
    let duplicate = "Ya existe otro estadio con ese nombre";

    require_record(stadiums::find_stadium(&pool, id_estadio).await, NOT_FOUND)?;
    ensure_not_exists(
        stadiums::find_stadium_id_by_name(&pool, &input.nombre, Some(id_estadio)).await,
        duplicate,
    )?;

    let estadio = stadiums::update_stadium(&pool, id_estadio, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Estadio actualizado exitosamente",
        "estadio": estadio
    })))
}

#[tracing::instrument(name = "Delete stadium", skip(pool))]
pub async fn delete_stadium(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_estadio = path.into_inner();
    require_record(stadiums::find_stadium(&pool, id_estadio).await, NOT_FOUND)?;

    let in_use = "No se puede eliminar el estadio porque tiene partidos registrados";
    ensure_unused(stadiums::count_stadium_matches(&pool, id_estadio).await, in_use)?;

    if !stadiums::delete_stadium(&pool, id_estadio)
        .await
        .map_err(|e| conflict_on_unique(e, in_use))?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("Stadium {} deleted", id_estadio);
    Ok(HttpResponse::Ok().json(json!({ "message": "Estadio eliminado exitosamente" })))
}
