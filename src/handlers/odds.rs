use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::db::helpers::require_record;
use crate::db::{betting_config, matches, odds, tournaments};
use crate::errors::ApiError;
use crate::league::validation::LeagueValidator;
use crate::models::betting::OddsRequest;
use crate::models::user::CurrentUser;

#[tracing::instrument(name = "Get match odds", skip(pool))]
pub async fn match_odds(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let cuotas = odds::list_active_odds(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "cuotas": cuotas })))
}

/// Replace the three odds of a match.
#[tracing::instrument(name = "Set match odds", skip(body, pool, admin), fields(admin = %admin.username))]
pub async fn set_match_odds(
    admin: CurrentUser,
    path: web::Path<i32>,
    body: web::Json<OddsRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let id_partido = path.into_inner();
    let cuotas = LeagueValidator::new().validate_odds(&body.cuotas)?;

    require_record(matches::find_match(&pool, id_partido).await, "Partido no encontrado")?;

    let mut tx = pool.begin().await?;
    let cuotas_creadas = odds::replace_odds(&mut tx, id_partido, &cuotas).await?;
    tx.commit().await?;

    tracing::info!("Odds of match {} replaced ({} rows)", id_partido, cuotas_creadas);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Cuotas actualizadas exitosamente",
        "partido_id": id_partido,
        "cuotas_creadas": cuotas_creadas
    })))
}

/// Matches open for betting in the configured tournament and round.
#[tracing::instrument(name = "List bettable matches", skip(pool))]
pub async fn bettable_matches(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let config = betting_config::load_config(&pool).await?;
    if !config.apuestas_habilitadas {
        return Ok(HttpResponse::Ok().json(json!({
            "partidos": [],
            "mensaje": "Las apuestas están temporalmente deshabilitadas"
        })));
    }

    let partidos = odds::list_bettable_matches(
        &pool,
        config.torneo_activo_id,
        config.fecha_habilitada,
        None,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "partidos": partidos })))
}

/// Same as [`bettable_matches`] minus the matches the caller already bet on.
#[tracing::instrument(name = "List matches without my bet", skip(pool, user), fields(username = %user.username))]
pub async fn matches_without_bet(
    user: CurrentUser,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let config = betting_config::load_config(&pool).await?;

    let torneo_activo_nombre = match config.torneo_activo_id {
        Some(id_torneo) => tournaments::find_tournament_option(&pool, id_torneo)
            .await?
            .map(|torneo| torneo.label()),
        None => None,
    };

    let partidos = if config.apuestas_habilitadas {
        odds::list_bettable_matches(
            &pool,
            config.torneo_activo_id,
            config.fecha_habilitada,
            Some(user.id_usuario),
        )
        .await?
    } else {
        Vec::new()
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total": partidos.len(),
        "partidos": partidos,
        "torneo_activo_id": config.torneo_activo_id,
        "torneo_activo_nombre": torneo_activo_nombre,
        "fecha_activa": config.fecha_habilitada
    })))
}
