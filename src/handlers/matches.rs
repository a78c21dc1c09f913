use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::betting::SettlementService;
use crate::db::helpers::{conflict_on_unique, ensure_not_exists, ensure_unused, require_record};
use crate::db::matches::{self, MatchQuery};
use crate::db::{stadiums, teams, tournaments};
use crate::errors::ApiError;
use crate::league::validation::LeagueValidator;
use crate::models::matches::{MatchFilters, MatchInput, MatchRequest, MatchStatus};

const NOT_FOUND: &str = "Partido no encontrado";

#[tracing::instrument(name = "List matches", skip(pool))]
pub async fn list_matches(
    filters: web::Query<MatchFilters>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let query = match_query(&filters)?;
    Ok(HttpResponse::Ok().json(matches::list_matches(&pool, &query).await?))
}

#[tracing::instrument(name = "Get match", skip(pool))]
pub async fn get_match(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let partido = require_record(matches::find_match(&pool, path.into_inner()).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(partido))
}

#[tracing::instrument(
    name = "Create match",
    skip(body, pool),
    fields(match_id_fbr = ?body.match_id_fbr)
)]
pub async fn create_match(
    body: web::Json<MatchRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let input = LeagueValidator::new().validate_match(&body)?;
    let duplicate = "Ya existe un partido con ese ID";

    check_references(&pool, &input).await?;
    ensure_not_exists(
        matches::find_match_id_by_fbr(&pool, &input.match_id_fbr, None).await,
        duplicate,
    )?;

    let id_partido = matches::insert_match(&pool, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?;

    tracing::info!("Match {} created with id {}", input.match_id_fbr, id_partido);
    let partido = require_record(matches::find_match(&pool, id_partido).await, NOT_FOUND)?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Partido creado exitosamente",
        "partido": partido
    })))
}

/// Writes the new score and, when the match ends up finished with both goal counts, settles its
/// bets in the same transaction.
#[tracing::instrument(name = "Update match", skip(body, pool))]
pub async fn update_match(
    path: web::Path<i32>,
    body: web::Json<MatchRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_partido = path.into_inner();
    let input = LeagueValidator::new().validate_match(&body)?;
    let duplicate = "Ya existe otro partido con ese ID de partido";

    require_record(matches::find_match(&pool, id_partido).await, NOT_FOUND)?;
    check_references(&pool, &input).await?;
    ensure_not_exists(
        matches::find_match_id_by_fbr(&pool, &input.match_id_fbr, Some(id_partido)).await,
        duplicate,
    )?;

    let mut tx = pool.begin().await?;
    let updated = matches::update_match(&mut tx, id_partido, &input)
        .await
        .map_err(|e| conflict_on_unique(e, duplicate))?;
    if !updated {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let liquidacion = if input.is_settleable() {
        Some(SettlementService::settle_in_transaction(&mut tx, id_partido).await?)
    } else {
        None
    };
    tx.commit().await?;

    if let Some(outcome) = &liquidacion {
        tracing::info!("Match {} updated and settled: {:?}", id_partido, outcome);
    }

    let partido = require_record(matches::find_match(&pool, id_partido).await, NOT_FOUND)?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Partido actualizado exitosamente",
        "liquidacion": liquidacion,
        "partido": partido
    })))
}

#[tracing::instrument(name = "Delete match", skip(pool))]
pub async fn delete_match(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_partido = path.into_inner();
    require_record(matches::find_match(&pool, id_partido).await, NOT_FOUND)?;

    let in_use = "No se puede eliminar el partido porque tiene estadísticas o apuestas asociadas";
    ensure_unused(matches::count_match_references(&pool, id_partido).await, in_use)?;

    if !matches::delete_match(&pool, id_partido)
        .await
        .map_err(|e| conflict_on_unique(e, in_use))?
    {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("Match {} deleted", id_partido);
    Ok(HttpResponse::Ok().json(json!({ "message": "Partido eliminado exitosamente" })))
}

#[tracing::instrument(name = "List match form tournaments", skip(pool))]
pub async fn list_tournament_options(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(tournaments::list_tournament_options(&pool).await?))
}

#[tracing::instrument(name = "List match form teams", skip(pool))]
pub async fn list_team_options(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(teams::list_team_options(&pool).await?))
}

#[tracing::instrument(name = "List match form stadiums", skip(pool))]
pub async fn list_stadium_options(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(stadiums::list_stadium_options(&pool).await?))
}

fn match_query(filters: &MatchFilters) -> Result<MatchQuery, ApiError> {
    let validator = LeagueValidator::new();
    let (limit, offset) = validator.validate_pagination(filters.limit, filters.offset)?;

    let estado = filters
        .estado
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<MatchStatus>().map_err(ApiError::validation))
        .transpose()?;

    let parse = |raw: &Option<String>| {
        raw.as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| validator.parse_date(s))
            .transpose()
    };

    Ok(MatchQuery {
        torneo_id: filters.torneo_id,
        equipo_id: filters.equipo_id,
        estado,
        numero_jornada: filters.numero_jornada,
        fecha_desde: parse(&filters.fecha_desde)?,
        fecha_hasta: parse(&filters.fecha_hasta)?,
        limit,
        offset,
    })
}

/// Tournament, both teams and the stadium must exist.
async fn check_references(pool: &PgPool, input: &MatchInput) -> Result<(), ApiError> {
    if !tournaments::tournament_exists(pool, input.id_torneo).await? {
        return Err(ApiError::validation("El torneo especificado no existe"));
    }
    for id_equipo in [input.id_equipo_local, input.id_equipo_visita] {
        if !teams::team_exists(pool, id_equipo).await? {
            return Err(ApiError::validation(format!(
                "El equipo {} especificado no existe",
                id_equipo
            )));
        }
    }
    if !stadiums::stadium_exists(pool, input.id_estadio).await? {
        return Err(ApiError::validation("El estadio especificado no existe"));
    }
    Ok(())
}
