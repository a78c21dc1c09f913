use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::betting::{place_bet, PlacementError, SettlementError, SettlementOutcome, SettlementService};
use crate::db::bets;
use crate::db::helpers::require_record;
use crate::db::tournaments;
use crate::errors::ApiError;
use crate::league::validation::LeagueValidator;
use crate::models::betting::{
    BatchBetItem, BatchBetRequest, BatchItemResult, BetTournamentsResponse, BettorWithBets,
    CleanupQuery, CleanupSummary, MyBetsQuery, PlaceBetRequest,
};
use crate::models::user::CurrentUser;

fn ensure_can_bet(user: &CurrentUser) -> Result<(), ApiError> {
    if !user.puede_apostar {
        return Err(ApiError::forbidden("No tienes permisos para realizar apuestas"));
    }
    Ok(())
}

impl From<PlacementError> for ApiError {
    fn from(error: PlacementError) -> Self {
        match error {
            PlacementError::MatchNotFound(_) => ApiError::not_found("Partido no encontrado"),
            PlacementError::NotScheduled(_) => ApiError::validation(
                "Solo se puede apostar en partidos programados. Este partido ya finalizó o está en curso.",
            ),
            PlacementError::TeamMismatch(_) => {
                ApiError::validation("El equipo predicho no corresponde al tipo de apuesta")
            }
            PlacementError::AlreadyPlaced(_) => ApiError::conflict(
                "Ya has apostado en este partido. Solo se permite una apuesta por partido.",
            ),
            PlacementError::NoOdds(_, _) => {
                ApiError::not_found("Cuota no encontrada para esta opción de apuesta")
            }
            PlacementError::Database(e) => ApiError::Database(e),
        }
    }
}

#[tracing::instrument(
    name = "Place bet",
    skip(body, pool, user),
    fields(username = %user.username, id_partido = ?body.id_partido)
)]
pub async fn create_bet(
    user: CurrentUser,
    body: web::Json<PlaceBetRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    ensure_can_bet(&user)?;
    let input = LeagueValidator::new().validate_bet(
        body.id_partido,
        body.tipo_apuesta.as_deref(),
        body.id_equipo_predicho,
    )?;

    let mut tx = pool.begin().await?;
    let apuesta = place_bet(&mut tx, user.id_usuario, &input).await?;
    tx.commit().await?;

    tracing::info!(
        "User {} bet {} on match {} at {}",
        user.username,
        input.outcome,
        input.id_partido,
        apuesta.valor_cuota
    );
    Ok(HttpResponse::Created().json(json!({
        "message": "Apuesta creada exitosamente",
        "apuesta": apuesta
    })))
}

/// Reason shown next to a failed batch item.
fn batch_failure_reason(error: &PlacementError) -> &'static str {
    match error {
        PlacementError::MatchNotFound(_) | PlacementError::NotScheduled(_) => {
            "Partido no disponible para apostar"
        }
        PlacementError::TeamMismatch(_) => "El equipo predicho no corresponde al tipo de apuesta",
        PlacementError::AlreadyPlaced(_) => "Ya apostaste en este partido",
        PlacementError::NoOdds(_, _) => "Cuota no disponible",
        PlacementError::Database(_) => "Error al procesar",
    }
}

fn batch_result(item: &BatchBetItem, error: Option<&str>) -> BatchItemResult {
    let label = item.partido_info.clone().unwrap_or_default();
    BatchItemResult {
        equipo_local: label.equipo_local.unwrap_or_else(|| "Desconocido".to_string()),
        equipo_visita: label.equipo_visita.unwrap_or_else(|| "Desconocido".to_string()),
        tipo_apuesta: item.tipo.clone().unwrap_or_else(|| "N/A".to_string()),
        error: error.map(str::to_string),
    }
}

async fn place_batch_item(
    pool: &PgPool,
    id_usuario: i32,
    item: &BatchBetItem,
) -> Result<(), &'static str> {
    let input = LeagueValidator::new()
        .validate_bet(item.id_partido, item.tipo.as_deref(), item.id_equipo_predicho)
        .map_err(|_| "Datos incompletos")?;

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!("Could not open transaction for batch bet: {:?}", e);
        "Error al procesar"
    })?;
    if let Err(e) = place_bet(&mut tx, id_usuario, &input).await {
        if let PlacementError::Database(ref db) = e {
            tracing::error!("Batch bet on match {} failed: {:?}", input.id_partido, db);
        }
        return Err(batch_failure_reason(&e));
    }
    tx.commit().await.map_err(|e| {
        tracing::error!("Could not commit batch bet: {:?}", e);
        "Error al procesar"
    })
}

/// Each item is placed in its own transaction; a failed item is reported and skipped.
#[tracing::instrument(
    name = "Place bets in batch",
    skip(body, pool, user),
    fields(username = %user.username, items = body.apuestas.len())
)]
pub async fn create_bets_batch(
    user: CurrentUser,
    body: web::Json<BatchBetRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    ensure_can_bet(&user)?;
    if body.apuestas.is_empty() {
        return Err(ApiError::validation("Se requiere un array de apuestas"));
    }

    let mut exitosas = Vec::new();
    let mut fallidas = Vec::new();
    for item in &body.apuestas {
        match place_batch_item(&pool, user.id_usuario, item).await {
            Ok(()) => exitosas.push(batch_result(item, None)),
            Err(reason) => fallidas.push(batch_result(item, Some(reason))),
        }
    }

    tracing::info!(
        "Batch for {}: {} placed, {} failed",
        user.username,
        exitosas.len(),
        fallidas.len()
    );
    Ok(HttpResponse::Ok().json(json!({
        "message": format!(
            "Proceso completado: {} exitosas, {} fallidas",
            exitosas.len(),
            fallidas.len()
        ),
        "exitosas": exitosas,
        "fallidas": fallidas
    })))
}

#[tracing::instrument(name = "List my bets", skip(pool, user), fields(username = %user.username))]
pub async fn my_bets(
    user: CurrentUser,
    query: web::Query<MyBetsQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let apuestas = bets::list_user_bets(
        &pool,
        user.id_usuario,
        query.estado.map(|e| e.as_str()),
        query.torneo,
        query.fecha,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "apuestas": apuestas })))
}

#[tracing::instrument(name = "Bet statistics", skip(pool, user), fields(username = %user.username))]
pub async fn my_stats(user: CurrentUser, pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let estadisticas = bets::user_stats(&pool, user.id_usuario).await?;
    Ok(HttpResponse::Ok().json(json!({ "estadisticas": estadisticas })))
}

fn rounds_by_tournament(rounds: Vec<(i32, i32)>) -> BTreeMap<i32, Vec<i32>> {
    let mut grouped: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
    for (id_torneo, jornada) in rounds {
        grouped.entry(id_torneo).or_default().push(jornada);
    }
    grouped
}

#[tracing::instrument(name = "My bet tournaments", skip(pool, user), fields(username = %user.username))]
pub async fn my_tournaments(
    user: CurrentUser,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let torneos = bets::user_bet_tournaments(&pool, user.id_usuario).await?;
    let rounds = bets::user_bet_rounds(&pool, user.id_usuario).await?;
    Ok(HttpResponse::Ok().json(BetTournamentsResponse {
        torneos,
        fechas_por_torneo: rounds_by_tournament(rounds),
    }))
}

/// Explicit settlement, for matches finalized before their bets could be resolved.
#[tracing::instrument(name = "Settle match bets", skip(pool, admin), fields(admin = %admin.username))]
pub async fn settle_match(
    admin: CurrentUser,
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_partido = path.into_inner();
    let service = SettlementService::new(pool.get_ref().clone());

    let outcome = match service.settle_match(id_partido).await {
        Err(SettlementError::MatchNotFound(_)) => {
            return Err(ApiError::not_found("Partido no encontrado"))
        }
        other => other?,
    };

    match outcome {
        SettlementOutcome::NotFinished => {
            Err(ApiError::validation("El partido aún no ha finalizado"))
        }
        SettlementOutcome::MissingScore => Err(ApiError::validation(
            "El partido no tiene resultado registrado. Actualiza el resultado antes de liquidar.",
        )),
        resultado => Ok(HttpResponse::Ok().json(json!({
            "message": "Apuestas liquidadas exitosamente",
            "resultado": resultado
        }))),
    }
}

#[tracing::instrument(name = "Bettors of tournament", skip(pool))]
pub async fn tournament_bettors(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_torneo = path.into_inner();

    let mut usuarios = Vec::new();
    for usuario in bets::list_bettors(&pool).await? {
        let apuestas = bets::user_tournament_bets(&pool, usuario.id_usuario, id_torneo).await?;
        let estadisticas =
            bets::user_tournament_stats(&pool, usuario.id_usuario, id_torneo).await?;
        usuarios.push(BettorWithBets {
            usuario,
            apuestas,
            estadisticas,
        });
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "usuarios": usuarios
    })))
}

#[tracing::instrument(name = "Clean user bets", skip(pool, admin), fields(admin = %admin.username))]
pub async fn clean_user_bets(
    admin: CurrentUser,
    path: web::Path<(i32, i32)>,
    query: web::Query<CleanupQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (id_usuario, id_torneo) = path.into_inner();

    let usuario = require_record(
        bets::find_username(&pool, id_usuario).await,
        "Usuario no encontrado",
    )?;
    let torneo = require_record(
        tournaments::find_tournament_option(&pool, id_torneo).await,
        "Torneo no encontrado",
    )?;

    let mut tx = pool.begin().await?;
    let (puntos_eliminados, apuestas_eliminadas) =
        bets::delete_user_tournament_bets(&mut tx, id_usuario, id_torneo, query.fecha).await?;
    tx.commit().await?;

    tracing::info!(
        "Removed {} bets and {} ledger rows of {} in tournament {}",
        apuestas_eliminadas,
        puntos_eliminados,
        usuario,
        id_torneo
    );

    let scope = match query.fecha {
        Some(fecha) => format!(" (Fecha {})", fecha),
        None => String::new(),
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!(
            "Apuestas de {} en {}{} eliminadas exitosamente",
            usuario, torneo.nombre, scope
        ),
        "resumen": CleanupSummary {
            usuario,
            torneo: torneo.nombre,
            fecha: query.fecha,
            apuestas_eliminadas,
            puntos_eliminados,
        }
    })))
}
