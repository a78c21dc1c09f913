use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::db::{betting_config, standings, tournaments};
use crate::errors::ApiError;
use crate::models::betting::{StandingsEntry, StandingsRow};

/// Rows come sorted from the query; positions are 1-based.
fn rank(rows: Vec<StandingsRow>) -> Vec<StandingsEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(i, fila)| StandingsEntry { posicion: i + 1, fila })
        .collect()
}

/// Ranking over the configured tournament and round.
#[tracing::instrument(name = "Standings table", skip(pool))]
pub async fn standings_table(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let config = betting_config::load_config(&pool).await?;
    let rows = standings::standings(&pool, config.torneo_activo_id, config.fecha_habilitada).await?;

    let torneo = match config.torneo_activo_id {
        Some(id_torneo) => tournaments::find_tournament_option(&pool, id_torneo).await?,
        None => None,
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "tabla": rank(rows),
        "torneo": torneo.map(|t| json!({ "id": t.id_torneo, "nombre": t.label() })),
        "fecha": config.fecha_habilitada
    })))
}
