use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::common::{
    deserialize_optional_bool, deserialize_optional_i32, deserialize_optional_string,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Programado,
    EnCurso,
    Finalizado,
    Suspendido,
    Cancelado,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Programado => "PROGRAMADO",
            MatchStatus::EnCurso => "EN_CURSO",
            MatchStatus::Finalizado => "FINALIZADO",
            MatchStatus::Suspendido => "SUSPENDIDO",
            MatchStatus::Cancelado => "CANCELADO",
        }
    }
}

impl Default for MatchStatus {
    fn default() -> Self {
        MatchStatus::Programado
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(' ', "_").as_str() {
            "PROGRAMADO" => Ok(MatchStatus::Programado),
            "EN_CURSO" => Ok(MatchStatus::EnCurso),
            "FINALIZADO" => Ok(MatchStatus::Finalizado),
            "SUSPENDIDO" => Ok(MatchStatus::Suspendido),
            "CANCELADO" => Ok(MatchStatus::Cancelado),
            other => Err(format!("Estado de partido no válido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Match {
    pub id_partido: i32,
    pub match_id_fbr: String,
    pub id_torneo: i32,
    pub fecha_partido: NaiveDateTime,
    pub fecha_torneo: Option<i32>,
    pub numero_jornada: Option<i32>,
    pub id_equipo_local: i32,
    pub id_equipo_visita: i32,
    pub id_estadio: i32,
    pub goles_local: Option<i32>,
    pub goles_visita: Option<i32>,
    pub es_campo_neutro: bool,
    pub arbitro: Option<String>,
    pub asistencia: Option<i32>,
    pub clima: Option<String>,
    pub estado_partido: MatchStatus,
    pub fecha_liquidacion: Option<DateTime<Utc>>,
}

/// A match joined with the names of everything it references.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MatchView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub partido: Match,
    pub nombre_torneo: String,
    pub temporada: i32,
    pub nombre_equipo_local: String,
    pub apodo_equipo_local: Option<String>,
    pub imagen_equipo_local: String,
    pub nombre_equipo_visita: String,
    pub apodo_equipo_visita: Option<String>,
    pub imagen_equipo_visita: String,
    pub nombre_estadio: String,
    pub ciudad_estadio: String,
}

/// Body of `POST /api/partidos` and `PUT /api/partidos/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub match_id_fbr: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_torneo: Option<i32>,
    pub fecha_partido: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_equipo_local: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_equipo_visita: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub id_estadio: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub goles_local: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub goles_visita: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub es_campo_neutro: Option<bool>,
    pub arbitro: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub asistencia: Option<i32>,
    pub clima: Option<String>,
    pub estado_partido: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub numero_jornada: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchInput {
    pub match_id_fbr: String,
    pub id_torneo: i32,
    pub fecha_partido: NaiveDateTime,
    /// `YYYYMMDD` of the match date.
    pub fecha_torneo: i32,
    pub numero_jornada: Option<i32>,
    pub id_equipo_local: i32,
    pub id_equipo_visita: i32,
    pub id_estadio: i32,
    pub goles_local: Option<i32>,
    pub goles_visita: Option<i32>,
    pub es_campo_neutro: bool,
    pub arbitro: Option<String>,
    pub asistencia: Option<i32>,
    pub clima: Option<String>,
    pub estado_partido: MatchStatus,
}

impl MatchInput {
    /// A finished match with both scores is what triggers settlement.
    pub fn is_settleable(&self) -> bool {
        self.estado_partido == MatchStatus::Finalizado
            && self.goles_local.is_some()
            && self.goles_visita.is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFilters {
    pub torneo_id: Option<i32>,
    pub equipo_id: Option<i32>,
    pub estado: Option<String>,
    pub numero_jornada: Option<i32>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_lenient_on_case_and_spaces() {
        assert_eq!("finalizado".parse::<MatchStatus>(), Ok(MatchStatus::Finalizado));
        assert_eq!("en curso".parse::<MatchStatus>(), Ok(MatchStatus::EnCurso));
        assert!("JUGADO".parse::<MatchStatus>().is_err());
    }

    #[test]
    fn status_serializes_in_upper_snake_case() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::EnCurso).unwrap(),
            "\"EN_CURSO\""
        );
    }
}
