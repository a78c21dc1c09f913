use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::common::deserialize_optional_i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TournamentFormat {
    Ruedas,
    Fases,
}

impl TournamentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentFormat::Ruedas => "RUEDAS",
            TournamentFormat::Fases => "FASES",
        }
    }
}

impl FromStr for TournamentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RUEDAS" => Ok(TournamentFormat::Ruedas),
            "FASES" => Ok(TournamentFormat::Fases),
            _ => Err("El formato de torneo debe ser: RUEDAS o FASES".to_string()),
        }
    }
}

/// Half of a double round-robin season, or the single round of a short one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Round {
    Primera,
    Segunda,
    Unica,
}

impl Round {
    pub fn as_str(&self) -> &'static str {
        match self {
            Round::Primera => "PRIMERA",
            Round::Segunda => "SEGUNDA",
            Round::Unica => "UNICA",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Round {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PRIMERA" => Ok(Round::Primera),
            "SEGUNDA" => Ok(Round::Segunda),
            "UNICA" | "ÚNICA" => Ok(Round::Unica),
            _ => Err("La rueda debe ser: PRIMERA, SEGUNDA o UNICA".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Tournament {
    pub id_torneo: i32,
    pub league_id_fbr: Option<i32>,
    pub nombre: String,
    pub pais_organizador: Option<i32>,
    pub rueda: Option<Round>,
    pub temporada: i32,
    pub formato_torneo: TournamentFormat,
    pub nombre_pais: Option<String>,
    pub codigo_pais: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Phase {
    pub id_fase: i32,
    #[serde(skip)]
    pub id_torneo: i32,
    pub nombre_fase: String,
    pub orden: i32,
    pub descripcion: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub torneo: Tournament,
    #[serde(rename = "FASES", skip_serializing_if = "Option::is_none")]
    pub fases: Option<Vec<Phase>>,
}

#[derive(Debug, Deserialize)]
pub struct PhaseRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRequest {
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub pais_organizador: Option<i32>,
    pub rueda: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub temporada: Option<i32>,
    pub formato_torneo: Option<String>,
    #[serde(default)]
    pub fases: Vec<PhaseRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseInput {
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TournamentInput {
    pub nombre: String,
    pub pais_organizador: Option<i32>,
    pub rueda: Option<Round>,
    pub temporada: i32,
    pub formato: TournamentFormat,
    /// Empty unless the format is `FASES`.
    pub fases: Vec<PhaseInput>,
}

/// Short tournament entry used by selects and the betting screens.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TournamentOption {
    pub id_torneo: i32,
    pub nombre: String,
    pub temporada: i32,
    pub rueda: Option<Round>,
}

impl TournamentOption {
    /// `"<NOMBRE> <TEMPORADA> - <Rueda> rueda"`, without the round part when there is none.
    pub fn label(&self) -> String {
        match self.rueda {
            Some(rueda) => {
                let upper = rueda.as_str();
                format!(
                    "{} {} - {}{} rueda",
                    self.nombre,
                    self.temporada,
                    &upper[..1],
                    upper[1..].to_lowercase()
                )
            }
            None => format!("{} {}", self.nombre, self.temporada),
        }
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Country {
    pub id_pais: i32,
    pub codigo_fifa: String,
    pub nombre: String,
}
