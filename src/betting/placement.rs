use sqlx::PgConnection;

use crate::betting::stake::{potential_return, FIXED_STAKE};
use crate::betting::Outcome;
use crate::db::bets::{self, BetMatch, NewBet};
use crate::models::betting::{Bet, BetInput};
use crate::models::matches::MatchStatus;

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("match {0} does not exist")]
    MatchNotFound(i32),
    #[error("match {0} is not scheduled")]
    NotScheduled(i32),
    #[error("predicted team does not play on the {0} side")]
    TeamMismatch(Outcome),
    #[error("user already bet on match {0}")]
    AlreadyPlaced(i32),
    #[error("no active odds for {1} on match {0}")]
    NoOdds(i32, Outcome),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Win and draw bets must name the side they back; a draw names no team.
fn check_predicted_team(partido: &BetMatch, bet: &BetInput) -> Result<(), PlacementError> {
    let expected = match bet.outcome {
        Outcome::Home => Some(partido.id_equipo_local),
        Outcome::Away => Some(partido.id_equipo_visita),
        Outcome::Draw => None,
    };
    if expected.is_some() && bet.id_equipo_predicho != expected {
        return Err(PlacementError::TeamMismatch(bet.outcome));
    }
    Ok(())
}

/// Place one bet at the fixed stake, priced with the match's current active odd.
///
/// Runs on the caller's connection; batch placement opens one transaction per item.
pub async fn place_bet(
    conn: &mut PgConnection,
    id_usuario: i32,
    bet: &BetInput,
) -> Result<Bet, PlacementError> {
    let partido = bets::find_bet_match(&mut *conn, bet.id_partido)
        .await?
        .ok_or(PlacementError::MatchNotFound(bet.id_partido))?;

    if partido.estado_partido != MatchStatus::Programado {
        return Err(PlacementError::NotScheduled(bet.id_partido));
    }
    check_predicted_team(&partido, bet)?;

    if bets::user_has_bet(&mut *conn, id_usuario, bet.id_partido).await? {
        return Err(PlacementError::AlreadyPlaced(bet.id_partido));
    }

    let valor_cuota = bets::active_odds_value(&mut *conn, bet.id_partido, bet.outcome)
        .await?
        .ok_or(PlacementError::NoOdds(bet.id_partido, bet.outcome))?;

    let new_bet = NewBet {
        id_usuario,
        id_partido: bet.id_partido,
        id_torneo: partido.id_torneo,
        outcome: bet.outcome,
        id_equipo_predicho: bet.id_equipo_predicho,
        monto_apuesta: FIXED_STAKE,
        valor_cuota,
        retorno_potencial: potential_return(valor_cuota),
    };

    bets::insert_bet(&mut *conn, &new_bet).await.map_err(|e| {
        let duplicate = e
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if duplicate {
            PlacementError::AlreadyPlaced(bet.id_partido)
        } else {
            PlacementError::Database(e)
        }
    })
}
