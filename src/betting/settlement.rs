//! Match settlement.
//!
//! Resolving the pending bets of a finished match happens in one transaction: the match row is
//! locked, every pending bet is moved to `ganada` or `perdida`, winners get a ledger row in
//! `historial_puntos`, and the match is stamped with `FECHA_LIQUIDACION`. A match that already
//! carries the stamp is left untouched, so a second call is a no-op.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::betting::outcome::{BetStatus, Outcome};
use crate::models::matches::MatchStatus;

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("match {0} does not exist")]
    MatchNotFound(i32),
    #[error("database error during settlement: {0}")]
    Database(#[from] sqlx::Error),
}

/// A bet still waiting for its match to finish.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingBet {
    pub id_apuesta: i32,
    pub id_usuario: i32,
    pub tipo_apuesta: String,
    pub retorno_potencial: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BetResolution {
    pub id_apuesta: i32,
    pub id_usuario: i32,
    pub estado: BetStatus,
    pub puntos: Decimal,
    /// The stored prediction is not one of the three outcomes.
    pub invalida: bool,
}

/// Decide the terminal state of every pending bet for a given match outcome.
///
/// A stored prediction that does not normalize to an outcome cannot win: it is settled as lost.
pub fn resolve_bets(outcome: Outcome, bets: &[PendingBet]) -> Vec<BetResolution> {
    bets.iter()
        .map(|bet| {
            let predicted = Outcome::parse_normalized(&bet.tipo_apuesta);
            if predicted.is_none() {
                tracing::warn!(
                    "Bet {} has an unrecognised prediction {:?}; settling it as lost",
                    bet.id_apuesta,
                    bet.tipo_apuesta
                );
            }

            let (estado, puntos) = if predicted == Some(outcome) {
                (BetStatus::Ganada, bet.retorno_potencial)
            } else {
                (BetStatus::Perdida, Decimal::ZERO)
            };
            BetResolution {
                id_apuesta: bet.id_apuesta,
                id_usuario: bet.id_usuario,
                estado,
                puntos,
                invalida: predicted.is_none(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SettlementSummary {
    pub id_partido: i32,
    pub resultado_partido: Outcome,
    pub apuestas_ganadas: usize,
    pub apuestas_perdidas: usize,
    pub total_liquidadas: usize,
    pub puntos_otorgados: Decimal,
    /// Lost bets whose prediction could not be read.
    pub apuestas_invalidas: usize,
}

impl SettlementSummary {
    pub fn from_resolutions(id_partido: i32, outcome: Outcome, resolutions: &[BetResolution]) -> Self {
        let apuestas_ganadas = resolutions
            .iter()
            .filter(|r| r.estado == BetStatus::Ganada)
            .count();
        Self {
            id_partido,
            resultado_partido: outcome,
            apuestas_ganadas,
            apuestas_perdidas: resolutions.len() - apuestas_ganadas,
            total_liquidadas: resolutions.len(),
            puntos_otorgados: resolutions.iter().map(|r| r.puntos).sum(),
            apuestas_invalidas: resolutions.iter().filter(|r| r.invalida).count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "estado")]
pub enum SettlementOutcome {
    #[serde(rename = "liquidado")]
    Settled(SettlementSummary),
    #[serde(rename = "ya_liquidado")]
    AlreadySettled { settled_at: DateTime<Utc> },
    #[serde(rename = "no_finalizado")]
    NotFinished,
    #[serde(rename = "sin_resultado")]
    MissingScore,
}

#[derive(Debug, sqlx::FromRow)]
struct MatchForSettlement {
    id_torneo: i32,
    goles_local: Option<i32>,
    goles_visita: Option<i32>,
    estado_partido: MatchStatus,
    fecha_liquidacion: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SettlementService {
    pool: PgPool,
}

impl SettlementService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settle a match in a transaction of its own.
    #[tracing::instrument(name = "Settle match", skip(self))]
    pub async fn settle_match(&self, id_partido: i32) -> Result<SettlementOutcome, SettlementError> {
        let mut tx = self.pool.begin().await?;
        let outcome = Self::settle_in_transaction(&mut tx, id_partido).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Settle a match on a connection that already has a transaction open.
    ///
    /// Nothing is committed here; the caller owns the transaction so that a score update and the
    /// settlement it triggers land together.
    pub async fn settle_in_transaction(
        conn: &mut PgConnection,
        id_partido: i32,
    ) -> Result<SettlementOutcome, SettlementError> {
        let partido: MatchForSettlement = sqlx::query_as(
            r#"
            SELECT ID_TORNEO, GOLES_LOCAL, GOLES_VISITA, ESTADO_PARTIDO, FECHA_LIQUIDACION
            FROM HECHOS_RESULTADOS
            WHERE ID_PARTIDO = $1
            FOR UPDATE
            "#,
        )
        .bind(id_partido)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(SettlementError::MatchNotFound(id_partido))?;

        if let Some(settled_at) = partido.fecha_liquidacion {
            tracing::info!("Match {} was already settled at {}", id_partido, settled_at);
            return Ok(SettlementOutcome::AlreadySettled { settled_at });
        }
        if partido.estado_partido != MatchStatus::Finalizado {
            return Ok(SettlementOutcome::NotFinished);
        }
        let (home_goals, away_goals) = match (partido.goles_local, partido.goles_visita) {
            (Some(home), Some(away)) => (home, away),
            _ => return Ok(SettlementOutcome::MissingScore),
        };

        let outcome = Outcome::from_score(home_goals, away_goals);

        let pending: Vec<PendingBet> = sqlx::query_as(
            r#"
            SELECT id_apuesta, id_usuario, tipo_apuesta, retorno_potencial
            FROM apuestas_usuarios
            WHERE id_partido = $1 AND estado = 'pendiente'
            ORDER BY id_apuesta
            FOR UPDATE
            "#,
        )
        .bind(id_partido)
        .fetch_all(&mut *conn)
        .await?;

        let resolutions = resolve_bets(outcome, &pending);

        for resolution in &resolutions {
            sqlx::query(
                r#"
                UPDATE apuestas_usuarios
                SET estado = $2, puntos_ganados = $3
                WHERE id_apuesta = $1 AND estado = 'pendiente'
                "#,
            )
            .bind(resolution.id_apuesta)
            .bind(resolution.estado)
            .bind(resolution.puntos)
            .execute(&mut *conn)
            .await?;

            if resolution.estado == BetStatus::Ganada {
                sqlx::query(
                    r#"
                    INSERT INTO historial_puntos (id_usuario, id_apuesta, id_partido, id_torneo, puntos_ganados)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (id_apuesta) DO NOTHING
                    "#,
                )
                .bind(resolution.id_usuario)
                .bind(resolution.id_apuesta)
                .bind(id_partido)
                .bind(partido.id_torneo)
                .bind(resolution.puntos)
                .execute(&mut *conn)
                .await?;
            }
        }

        sqlx::query("UPDATE HECHOS_RESULTADOS SET FECHA_LIQUIDACION = NOW() WHERE ID_PARTIDO = $1")
            .bind(id_partido)
            .execute(&mut *conn)
            .await?;

        let summary = SettlementSummary::from_resolutions(id_partido, outcome, &resolutions);
        tracing::info!(
            "Settled match {} ({}-{} => {}): {} won, {} lost",
            id_partido,
            home_goals,
            away_goals,
            outcome,
            summary.apuestas_ganadas,
            summary.apuestas_perdidas
        );

        Ok(SettlementOutcome::Settled(summary))
    }
}
