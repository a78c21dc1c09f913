use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::{PgConnection, PgPool};

use crate::db::helpers::{conflict_on_unique, ensure_not_exists, ensure_unused, require_record};
use crate::db::players;
use crate::errors::ApiError;
use crate::league::validation::LeagueValidator;
use crate::models::player::{PlayerInput, PlayerRequest};

const NOT_FOUND: &str = "Jugador no encontrado";

#[tracing::instrument(name = "List players", skip(pool))]
pub async fn list_players(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(players::list_players(&pool).await?))
}

#[tracing::instrument(name = "Get player", skip(pool))]
pub async fn get_player(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let jugador = require_record(players::find_player(&pool, path.into_inner()).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(jugador))
}

#[tracing::instrument(
    name = "Create player",
    skip(body, pool),
    fields(player_id_fbr = ?body.player_id_fbr)
)]
pub async fn create_player(
    body: web::Json<PlayerRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let input = LeagueValidator::new().validate_player(&body)?;
    let duplicate = "Ya existe un jugador con ese PLAYER_ID_FBR";

    ensure_not_exists(
        players::find_player_id_by_fbr(&pool, &input.player_id_fbr, None).await,
        duplicate,
    )?;

    let mut tx = pool.begin().await?;
    let id_jugador = players::insert_player(&mut tx, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?;
    write_relations(&mut tx, id_jugador, &input).await?;
    tx.commit().await?;

    tracing::info!("Player {} created with id {}", input.player_id_fbr, id_jugador);
    let jugador = require_record(players::find_player(&pool, id_jugador).await, NOT_FOUND)?;
    Ok(HttpResponse::Created().json(jugador))
}

#[tracing::instrument(name = "Update player", skip(body, pool))]
pub async fn update_player(
    path: web::Path<i32>,
    body: web::Json<PlayerRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_jugador = path.into_inner();
    let input = LeagueValidator::new().validate_player(&body)?;
    let duplicate = "Ya existe otro jugador con ese PLAYER_ID_FBR";

    require_record(players::find_player(&pool, id_jugador).await, NOT_FOUND)?;
    ensure_not_exists(
        players::find_player_id_by_fbr(&pool, &input.player_id_fbr, Some(id_jugador)).await,
        duplicate,
    )?;

    let mut tx = pool.begin().await?;
    let updated = players::update_player(&mut tx, id_jugador, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?;
    if !updated {
        return Err(ApiError::not_found(NOT_FOUND));
    }
    write_relations(&mut tx, id_jugador, &input).await?;
    tx.commit().await?;

    let jugador = require_record(players::find_player(&pool, id_jugador).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(jugador))
}

#[tracing::instrument(name = "Delete player", skip(pool))]
pub async fn delete_player(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_jugador = path.into_inner();
    require_record(players::find_player(&pool, id_jugador).await, NOT_FOUND)?;

    let in_use = "No se puede eliminar el jugador porque tiene estadísticas registradas";
    ensure_unused(players::count_player_statistics(&pool, id_jugador).await, in_use)?;

    if !players::delete_player(&pool, id_jugador)
        .await
        .map_err(|e| conflict_on_unique(e, in_use))?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("Player {} deleted", id_jugador);
    Ok(HttpResponse::Ok().json(json!({ "message": "Jugador eliminado exitosamente" })))
}

#[tracing::instrument(name = "List countries", skip(pool))]
pub async fn list_countries(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(players::list_countries(&pool).await?))
}

#[tracing::instrument(name = "List positions", skip(pool))]
pub async fn list_positions(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(players::list_positions(&pool).await?))
}

/// Resolve codes to ids and rewrite the player's countries and positions.
async fn write_relations(
    conn: &mut PgConnection,
    id_jugador: i32,
    input: &PlayerInput,
) -> Result<(), ApiError> {
    let countries = players::country_ids(conn, &input.nacionalidades).await?;
    let country_ids = resolve_codes(&input.nacionalidades, &countries, "Código de país no válido")?;

    let positions = players::position_ids(conn, &input.posiciones).await?;
    let position_ids = resolve_codes(&input.posiciones, &positions, "Código de posición no válido")?;

    players::replace_relations(conn, id_jugador, &country_ids, &position_ids).await?;
    Ok(())
}

/// Ids in the order the codes were given. The first unknown code is a validation error.
fn resolve_codes(
    codes: &[String],
    known: &HashMap<String, i32>,
    message: &str,
) -> Result<Vec<i32>, ApiError> {
    codes
        .iter()
        .map(|code| {
            known
                .get(code)
                .copied()
                .ok_or_else(|| ApiError::validation(format!("{}: {}", message, code)))
        })
        .collect()
}
