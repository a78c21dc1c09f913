use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::db::helpers::{conflict_on_unique, ensure_not_exists, ensure_unused, require_record};
use crate::db::{players, tournaments};
use crate::errors::ApiError;
use crate::league::validation::LeagueValidator;
use crate::models::tournament::{TournamentInput, TournamentRequest};

const NOT_FOUND: &str = "Torneo no encontrado";

#[tracing::instrument(name = "List tournaments", skip(pool))]
pub async fn list_tournaments(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(tournaments::list_tournaments(&pool).await?))
}

#[tracing::instrument(name = "Get tournament", skip(pool))]
pub async fn get_tournament(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let torneo = require_record(
        tournaments::find_tournament(&pool, path.into_inner()).await,
        NOT_FOUND,
    )?;
    Ok(HttpResponse::Ok().json(torneo))
}

#[tracing::instrument(
    name = "Create tournament",
    skip(body, pool),
    fields(nombre = ?body.nombre, temporada = ?body.temporada)
)]
pub async fn create_tournament(
    body: web::Json<TournamentRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let input = LeagueValidator::new().validate_tournament(&body)?;
    let duplicate = "Ya existe un torneo con esas características";

    check_country(&pool, &input).await?;
    ensure_not_exists(
        tournaments::find_tournament_id_by_key(&pool, &input, None).await,
        duplicate,
    )?;

    let mut tx = pool.begin().await?;
    let id_torneo = tournaments::insert_tournament(&mut tx, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?;
    tournaments::replace_phases(&mut tx, id_torneo, &input.fases).await?;
    tx.commit().await?;

    tracing::info!("Tournament {} {} created with id {}", input.nombre, input.temporada, id_torneo);
    let torneo = require_record(tournaments::find_tournament(&pool, id_torneo).await, NOT_FOUND)?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Torneo creado exitosamente",
        "torneo": torneo
    })))
}

#[tracing::instrument(name = "Update tournament", skip(body, pool))]
pub async fn update_tournament(
    path: web::Path<i32>,
    body: web::Json<TournamentRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_torneo = path.into_inner();
    let input = LeagueValidator::new().validate_tournament(&body)?;
    let duplicate = "Ya existe otro torneo con esas características";

    require_record(tournaments::find_tournament(&pool, id_torneo).await, NOT_FOUND)?;
    check_country(&pool, &input).await?;
    ensure_not_exists(
        tournaments::find_tournament_id_by_key(&pool, &input, Some(id_torneo)).await,
        duplicate,
    )?;

    let mut tx = pool.begin().await?;
    let updated = tournaments::update_tournament(&mut tx, id_torneo, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?;
    if !updated {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    // Switching to RUEDAS leaves `fases` empty, which clears the old phases.
    tournaments::replace_phases(&mut tx, id_torneo, &input.fases).await?;
    tx.commit().await?;

    let torneo = require_record(tournaments::find_tournament(&pool, id_torneo).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Torneo actualizado exitosamente",
        "torneo": torneo
    })))
}

#[tracing::instrument(name = "Delete tournament", skip(pool))]
pub async fn delete_tournament(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_torneo = path.into_inner();
    require_record(tournaments::find_tournament(&pool, id_torneo).await, NOT_FOUND)?;

    let in_use = "No se puede eliminar el torneo porque tiene partidos registrados";
    ensure_unused(tournaments::count_tournament_matches(&pool, id_torneo).await, in_use)?;

    if !tournaments::delete_tournament(&pool, id_torneo)
        .await
        .map_err(|e| conflict_on_unique(e, in_use))?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("Tournament {} deleted", id_torneo);
    Ok(HttpResponse::Ok().json(json!({ "message": "Torneo eliminado exitosamente" })))
}

#[tracing::instrument(name = "List tournament countries", skip(pool))]
pub async fn list_countries(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(tournaments::list_countries(&pool).await?))
}

#[tracing::instrument(name = "List tournament positions", skip(pool))]
pub async fn list_positions(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(players::list_positions(&pool).await?))
}

async fn check_country(pool: &PgPool, input: &TournamentInput) -> Result<(), ApiError> {
    match input.pais_organizador {
        Some(id_pais) if !tournaments::country_exists(pool, id_pais).await? => Err(
            ApiError::validation("El país organizador especificado no existe"),
        ),
        _ => Ok(()),
    }
}
