use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::db::{betting_config, odds, tournaments};
use crate::errors::ApiError;
use crate::models::betting::{
    BettingConfig, MatchWithOdds, Odds, TournamentRounds, UpdateConfigRequest,
};
use crate::models::user::CurrentUser;

/// Public: the frontend reads it before login to decide what to show.
#[tracing::instrument(name = "Get betting config", skip(pool))]
pub async fn get_config(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let config = betting_config::load_config(&pool).await?;

    let torneo_activo_nombre = match config.torneo_activo_id {
        Some(id_torneo) => tournaments::find_tournament_option(&pool, id_torneo)
            .await?
            .map(|torneo| torneo.label()),
        None => None,
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "config": {
            "apuestas_habilitadas": config.apuestas_habilitadas,
            "torneo_activo_id": config.torneo_activo_id,
            "fecha_habilitada": config.fecha_habilitada,
            "torneo_activo_nombre": torneo_activo_nombre
        }
    })))
}

fn optional_value(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Partial update: keys left out of the body keep their stored value.
#[tracing::instrument(name = "Update betting config", skip(body, pool, admin), fields(admin = %admin.username))]
pub async fn update_config(
    admin: CurrentUser,
    body: web::Json<UpdateConfigRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();

    if let Some(Some(id_torneo)) = request.torneo_activo_id {
        if !tournaments::tournament_exists(&pool, id_torneo).await? {
            return Err(ApiError::validation("El torneo especificado no existe"));
        }
    }
    if let Some(Some(fecha)) = request.fecha_habilitada {
        if fecha < 1 {
            return Err(ApiError::validation("La fecha debe ser un número positivo"));
        }
    }

    let mut tx = pool.begin().await?;
    if let Some(habilitadas) = request.apuestas_habilitadas {
        betting_config::set_value(
            &mut tx,
            BettingConfig::APUESTAS_HABILITADAS,
            if habilitadas { "true" } else { "false" },
        )
        .await?;
    }
    if let Some(torneo) = request.torneo_activo_id {
        betting_config::set_value(&mut tx, BettingConfig::TORNEO_ACTIVO_ID, &optional_value(torneo))
            .await?;
    }
    if let Some(fecha) = request.fecha_habilitada {
        betting_config::set_value(&mut tx, BettingConfig::FECHA_HABILITADA, &optional_value(fecha))
            .await?;
    }
    tx.commit().await?;

    let config = betting_config::load_config(&pool).await?;
    tracing::info!("Betting config updated: {:?}", config);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Configuración actualizada exitosamente",
        "config": {
            "apuestas_habilitadas": config.apuestas_habilitadas,
            "torneo_activo_id": config.torneo_activo_id,
            "fecha_habilitada": config.fecha_habilitada
        }
    })))
}

#[tracing::instrument(name = "Tournaments with rounds", skip(pool))]
pub async fn tournaments_with_rounds(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let mut rounds: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for (id_torneo, jornada) in betting_config::tournament_rounds(&pool).await? {
        rounds.entry(id_torneo).or_default().push(jornada);
    }

    let torneos: Vec<TournamentRounds> = betting_config::tournaments_with_matches(&pool)
        .await?
        .into_iter()
        .map(|torneo| TournamentRounds {
            fechas: rounds.remove(&torneo.id_torneo).unwrap_or_default(),
            id_torneo: torneo.id_torneo,
            nombre: torneo.nombre,
            temporada: torneo.temporada,
            rueda: torneo.rueda,
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "torneos": torneos
    })))
}

/// `todas` lists every round of the tournament.
fn parse_round(raw: &str) -> Result<Option<i32>, ApiError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("todas") {
        return Ok(None);
    }
    raw.parse::<i32>()
        .map(Some)
        .map_err(|_| ApiError::validation("La fecha debe ser un número o 'todas'"))
}

#[tracing::instrument(name = "Round matches with odds", skip(pool))]
pub async fn round_matches(
    path: web::Path<(i32, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (id_torneo, fecha) = path.into_inner();
    let jornada = parse_round(&fecha)?;

    let partidos = odds::list_round_matches(&pool, id_torneo, jornada).await?;
    let ids: Vec<i32> = partidos.iter().map(|p| p.id_partido).collect();
    let mut odds_by_match: BTreeMap<i32, Vec<Odds>> = BTreeMap::new();
    for cuota in odds::list_odds_for_matches(&pool, &ids).await? {
        odds_by_match.entry(cuota.id_partido).or_default().push(cuota);
    }

    let partidos: Vec<MatchWithOdds> = partidos
        .into_iter()
        .map(|partido| {
            let cuotas = odds_by_match.remove(&partido.id_partido).unwrap_or_default();
            let activas = cuotas.iter().filter(|c| c.activa).count();
            MatchWithOdds {
                partido,
                tiene_cuotas: activas == 3,
                cuotas,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "partidos": partidos
    })))
}
