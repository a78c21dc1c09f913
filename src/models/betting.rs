use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::betting::{BetStatus, Outcome};
use crate::models::common::{
    deserialize_clearable_i32, deserialize_optional_bool, deserialize_optional_i32,
};
use crate::models::matches::MatchStatus;
use crate::models::tournament::{Round, TournamentFormat, TournamentOption};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Bet {
    pub id_apuesta: i32,
    pub id_usuario: i32,
    pub id_partido: i32,
    pub id_torneo: i32,
    /// Kept as stored text: legacy rows may not parse as an [`Outcome`].
    pub tipo_apuesta: String,
    pub id_equipo_predicho: Option<i32>,
    pub monto_apuesta: Decimal,
    pub valor_cuota: Decimal,
    pub retorno_potencial: Decimal,
    pub estado: BetStatus,
    pub puntos_ganados: Decimal,
    pub fecha_apuesta: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_partido: Option<i32>,
    pub tipo_apuesta: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_equipo_predicho: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLabel {
    pub equipo_local: Option<String>,
    pub equipo_visita: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchBetItem {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_partido: Option<i32>,
    pub tipo: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_equipo_predicho: Option<i32>,
    #[serde(default)]
    pub partido_info: Option<MatchLabel>,
}

#[derive(Debug, Deserialize)]
pub struct BatchBetRequest {
    #[serde(default)]
    pub apuestas: Vec<BatchBetItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub equipo_local: String,
    pub equipo_visita: String,
    pub tipo_apuesta: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A validated bet, ready to be checked against the match and its odds.
#[derive(Debug, Clone, PartialEq)]
pub struct BetInput {
    pub id_partido: i32,
    pub outcome: Outcome,
    pub id_equipo_predicho: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MyBetsQuery {
    pub estado: Option<BetStatus>,
    pub torneo: Option<i32>,
    pub fecha: Option<i32>,
}

/// A bet joined with its match, tournament and teams.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BetView {
    pub id_apuesta: i32,
    pub id_partido: i32,
    pub tipo_apuesta: String,
    pub monto_apuesta: Decimal,
    pub valor_cuota: Decimal,
    pub retorno_potencial: Decimal,
    pub estado: BetStatus,
    pub puntos_ganados: Decimal,
    pub fecha_apuesta: DateTime<Utc>,
    #[serde(rename = "FECHA_PARTIDO")]
    pub fecha_partido: NaiveDateTime,
    #[serde(rename = "NUMERO_JORNADA")]
    pub numero_jornada: Option<i32>,
    #[serde(rename = "GOLES_LOCAL")]
    pub goles_local: Option<i32>,
    #[serde(rename = "GOLES_VISITA")]
    pub goles_visita: Option<i32>,
    #[serde(rename = "ESTADO_PARTIDO")]
    pub estado_partido: MatchStatus,
    #[serde(rename = "ID_TORNEO")]
    pub id_torneo: i32,
    pub nombre_torneo: String,
    pub equipo_local: String,
    pub imagen_local: Option<String>,
    pub equipo_visita: String,
    pub imagen_visita: Option<String>,
    pub equipo_predicho: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct BetStats {
    pub total_apuestas: i64,
    pub apuestas_ganadas: i64,
    pub apuestas_perdidas: i64,
    pub apuestas_pendientes: i64,
    pub total_puntos: Decimal,
    pub porcentaje_aciertos: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BetTournament {
    pub id_torneo: i32,
    pub nombre: String,
    pub temporada: i32,
    pub rueda: Option<Round>,
    pub formato_torneo: TournamentFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetTournamentsResponse {
    pub torneos: Vec<BetTournament>,
    /// Rounds per tournament id.
    pub fechas_por_torneo: BTreeMap<i32, Vec<i32>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BettorSummary {
    pub id_usuario: i32,
    pub username: String,
    pub email: Option<String>,
    pub nombre_completo: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BettorWithBets {
    #[serde(flatten)]
    pub usuario: BettorSummary,
    pub apuestas: Vec<BetView>,
    pub estadisticas: BetStats,
}

#[derive(Debug, Deserialize)]
pub struct CleanupQuery {
    pub fecha: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CleanupSummary {
    pub usuario: String,
    pub torneo: String,
    pub fecha: Option<i32>,
    pub apuestas_eliminadas: u64,
    pub puntos_eliminados: u64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Odds {
    pub id_cuota: i32,
    pub id_partido: i32,
    pub tipo_resultado: Outcome,
    pub id_equipo: Option<i32>,
    pub cuota_decimal: Decimal,
    pub activa: bool,
    pub fecha_actualizacion: DateTime<Utc>,
    pub nombre_equipo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OddsItem {
    pub tipo_resultado: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_equipo: Option<i32>,
    pub cuota_decimal: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct OddsRequest {
    #[serde(default)]
    pub cuotas: Vec<OddsItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OddsInput {
    pub outcome: Outcome,
    pub id_equipo: Option<i32>,
    pub cuota_decimal: Decimal,
}

/// A scheduled match that can currently be bet on.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BettableMatch {
    #[serde(rename = "ID_PARTIDO")]
    pub id_partido: i32,
    #[serde(rename = "MATCH_ID_FBR")]
    pub match_id_fbr: String,
    #[serde(rename = "FECHA_PARTIDO")]
    pub fecha_partido: NaiveDateTime,
    #[serde(rename = "ESTADO_PARTIDO")]
    pub estado_partido: MatchStatus,
    #[serde(rename = "NUMERO_JORNADA")]
    pub numero_jornada: Option<i32>,
    #[serde(rename = "ID_TORNEO")]
    pub id_torneo: i32,
    pub nombre_torneo: String,
    pub equipo_local: String,
    pub id_equipo_local: i32,
    pub imagen_local: String,
    pub equipo_visita: String,
    pub id_equipo_visita: i32,
    pub imagen_visita: String,
    #[serde(rename = "GOLES_LOCAL")]
    pub goles_local: Option<i32>,
    #[serde(rename = "GOLES_VISITA")]
    pub goles_visita: Option<i32>,
    pub total_cuotas: i64,
}

/// A match of one tournament round with whatever odds it has, for the admin config screen.
#[derive(Debug, Serialize)]
pub struct MatchWithOdds {
    #[serde(flatten)]
    pub partido: RoundMatch,
    pub cuotas: Vec<Odds>,
    pub tiene_cuotas: bool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RoundMatch {
    #[serde(rename = "ID_PARTIDO")]
    pub id_partido: i32,
    #[serde(rename = "MATCH_ID_FBR")]
    pub match_id_fbr: String,
    #[serde(rename = "FECHA_PARTIDO")]
    pub fecha_partido: NaiveDateTime,
    #[serde(rename = "ESTADO_PARTIDO")]
    pub estado_partido: MatchStatus,
    #[serde(rename = "NUMERO_JORNADA")]
    pub numero_jornada: Option<i32>,
    #[serde(rename = "GOLES_LOCAL")]
    pub goles_local: Option<i32>,
    #[serde(rename = "GOLES_VISITA")]
    pub goles_visita: Option<i32>,
    pub equipo_local: String,
    pub id_equipo_local: i32,
    pub imagen_local: String,
    pub equipo_visita: String,
    pub id_equipo_visita: i32,
    pub imagen_visita: String,
}

/// Global switches read by the odds and standings screens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BettingConfig {
    pub apuestas_habilitadas: bool,
    pub torneo_activo_id: Option<i32>,
    pub fecha_habilitada: Option<i32>,
}

impl BettingConfig {
    pub const APUESTAS_HABILITADAS: &'static str = "apuestas_habilitadas";
    pub const TORNEO_ACTIVO_ID: &'static str = "torneo_activo_id";
    pub const FECHA_HABILITADA: &'static str = "fecha_habilitada";

    /// Build from the raw key/value rows. Unparseable values count as unset.
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        let number = |key: &str| {
            entries
                .get(key)
                .and_then(|v| v.trim().parse::<i32>().ok())
        };
        Self {
            apuestas_habilitadas: entries
                .get(Self::APUESTAS_HABILITADAS)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),
            torneo_activo_id: number(Self::TORNEO_ACTIVO_ID),
            fecha_habilitada: number(Self::FECHA_HABILITADA),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ConfigEntry {
    pub clave: String,
    pub valor: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateConfigRequest {
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub apuestas_habilitadas: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_clearable_i32")]
    pub torneo_activo_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_clearable_i32")]
    pub fecha_habilitada: Option<Option<i32>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TournamentRounds {
    pub id_torneo: i32,
    pub nombre: String,
    pub temporada: i32,
    pub rueda: Option<Round>,
    #[serde(rename = "fechas")]
    pub fechas: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StandingsRow {
    pub id_usuario: i32,
    pub username: String,
    pub nombre_completo: Option<String>,
    pub total_apuestas: i64,
    pub apuestas_ganadas: i64,
    pub apuestas_perdidas: i64,
    pub apuestas_pendientes: i64,
    pub puntos_totales: Decimal,
    pub porcentaje_aciertos: Decimal,
}

#[derive(Debug, Serialize)]
pub struct StandingsEntry {
    pub posicion: usize,
    #[serde(flatten)]
    pub fila: StandingsRow,
}

/// Filters for the shared predictions board. Unset values fall back to the betting config.
#[derive(Debug, Default, Deserialize)]
pub struct PredictionsQuery {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub torneo: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub fecha: Option<i32>,
}

/// One user's bet as everyone sees it once betting is closed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PredictionView {
    pub id_usuario: i32,
    pub username: String,
    pub nombre_completo: Option<String>,
    pub tipo_apuesta: String,
    pub valor_cuota: Decimal,
    pub retorno_potencial: Decimal,
    pub estado: BetStatus,
    pub puntos_ganados: Decimal,
    pub fecha_apuesta: DateTime<Utc>,
    #[serde(rename = "ID_PARTIDO")]
    pub id_partido: i32,
    #[serde(rename = "NUMERO_JORNADA")]
    pub numero_jornada: Option<i32>,
    #[serde(rename = "FECHA_PARTIDO")]
    pub fecha_partido: NaiveDateTime,
    #[serde(rename = "GOLES_LOCAL")]
    pub goles_local: Option<i32>,
    #[serde(rename = "GOLES_VISITA")]
    pub goles_visita: Option<i32>,
    #[serde(rename = "ESTADO_PARTIDO")]
    pub estado_partido: MatchStatus,
    pub nombre_torneo: String,
    #[serde(rename = "TEMPORADA")]
    pub temporada: i32,
    pub equipo_local: String,
    pub equipo_visita: String,
    pub equipo_predicho: Option<String>,
}

/// A match that received at least one bet.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PredictedMatch {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub partido: RoundMatch,
    pub nombre_torneo: String,
    #[serde(rename = "TEMPORADA")]
    pub temporada: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PredictionCount {
    pub local: usize,
    pub empate: usize,
    pub visita: usize,
    pub total: usize,
}

impl PredictionCount {
    /// Unreadable predictions only count towards the total.
    pub fn tally(bets: &[PredictionView]) -> Self {
        bets.iter().fold(Self::default(), |mut count, bet| {
            match Outcome::parse_normalized(&bet.tipo_apuesta) {
                Some(Outcome::Home) => count.local += 1,
                Some(Outcome::Draw) => count.empate += 1,
                Some(Outcome::Away) => count.visita += 1,
                None => {}
            }
            count.total += 1;
            count
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPredictions {
    #[serde(flatten)]
    pub partido: PredictedMatch,
    pub apuestas: Vec<PredictionView>,
    pub conteo_apuestas: PredictionCount,
}

/// A tournament with bets, for the board's tournament picker.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PredictionTournament {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub torneo: TournamentOption,
    pub total_apuestas: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RoundActivity {
    pub fecha: i32,
    pub total_partidos: i64,
    pub total_apuestas: i64,
}
