use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::db::{betting_config, predictions, tournaments};
use crate::errors::ApiError;
use crate::models::betting::{
    BettingConfig, MatchPredictions, PredictedMatch, PredictionCount, PredictionView,
    PredictionsQuery,
};

/// Other users' picks stay hidden while bets can still be placed.
fn ensure_betting_closed(config: &BettingConfig, message: &str) -> Result<(), ApiError> {
    if config.apuestas_habilitadas {
        return Err(ApiError::forbidden(message));
    }
    Ok(())
}

/// Explicit filters win over the configured tournament and round.
fn board_filter(config: &BettingConfig, query: &PredictionsQuery) -> (Option<i32>, Option<i32>) {
    (
        query.torneo.or(config.torneo_activo_id),
        query.fecha.or(config.fecha_habilitada),
    )
}

/// Attach each match's bets, keeping the match order.
fn group_by_match(
    partidos: Vec<PredictedMatch>,
    apuestas: Vec<PredictionView>,
) -> Vec<MatchPredictions> {
    let mut by_match: BTreeMap<i32, Vec<PredictionView>> = BTreeMap::new();
    for apuesta in apuestas {
        by_match.entry(apuesta.id_partido).or_default().push(apuesta);
    }

    partidos
        .into_iter()
        .map(|partido| {
            let apuestas = by_match.remove(&partido.partido.id_partido).unwrap_or_default();
            MatchPredictions {
                conteo_apuestas: PredictionCount::tally(&apuestas),
                partido,
                apuestas,
            }
        })
        .collect()
}

#[tracing::instrument(name = "All predictions", skip(pool))]
pub async fn all_predictions(
    query: web::Query<PredictionsQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let config = betting_config::load_config(&pool).await?;
    ensure_betting_closed(
        &config,
        "Los pronósticos solo están disponibles cuando las apuestas están cerradas",
    )?;

    let (id_torneo, fecha) = board_filter(&config, &query);
    let pronosticos = predictions::predictions(&pool, id_torneo, fecha).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "pronosticos": pronosticos,
        "torneo": id_torneo,
        "fecha": fecha
    })))
}

#[tracing::instrument(name = "Predictions by match", skip(pool))]
pub async fn predictions_by_match(
    query: web::Query<PredictionsQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let config = betting_config::load_config(&pool).await?;
    ensure_betting_closed(
        &config,
        "Las apuestas de los usuarios solo están disponibles cuando las apuestas están cerradas",
    )?;

    let (id_torneo, fecha) = board_filter(&config, &query);
    let partidos = predictions::predicted_matches(&pool, id_torneo, fecha).await?;
    let apuestas = predictions::predictions(&pool, id_torneo, fecha).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "partidos": group_by_match(partidos, apuestas),
        "torneo": id_torneo,
        "fecha": fecha
    })))
}

#[tracing::instrument(name = "Tournaments with predictions", skip(pool))]
pub async fn available_tournaments(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let torneos = predictions::tournaments_with_bets(&pool).await?;
    let torneos: Vec<_> = torneos
        .into_iter()
        .map(|t| {
            json!({
                "id": t.torneo.id_torneo,
                "nombre": t.torneo.label(),
                "torneo": t.torneo,
                "total_apuestas": t.total_apuestas
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({ "success": true, "torneos": torneos })))
}

#[tracing::instrument(name = "Tournament rounds", skip(pool))]
pub async fn tournament_rounds(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_torneo = path.into_inner();
    let torneo = tournaments::find_tournament_option(&pool, id_torneo)
        .await?
        .ok_or_else(|| ApiError::not_found("Torneo no encontrado"))?;
    let fechas = predictions::tournament_round_activity(&pool, id_torneo).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "torneo": { "id": torneo.id_torneo, "nombre": torneo.label() },
        "fechas": fechas
    })))
}

/// The round of the latest match with bets, within `?torneo=` or the active tournament if set.
#[tracing::instrument(name = "Latest round", skip(pool))]
pub async fn latest_round(
    query: web::Query<PredictionsQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let config = betting_config::load_config(&pool).await?;
    let id_torneo = query.torneo.or(config.torneo_activo_id);
    let latest = predictions::latest_bet_round(&pool, id_torneo).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "torneo": latest.map(|(torneo, _)| torneo),
        "fecha": latest.map(|(_, fecha)| fecha)
    })))
}
