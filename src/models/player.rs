use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::common::{deserialize_optional_string, CodeName};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Player {
    pub id_jugador: i32,
    pub player_id_fbr: String,
    pub nombre_completo: String,
    pub apodo: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub pie_dominante: Option<String>,
}

/// A player together with the countries and positions attached to it.
#[derive(Debug, Serialize)]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub player: Player,
    pub nacionalidades: Vec<CodeName>,
    pub posiciones: Vec<CodeName>,
}

/// One relation row, keyed by the owning player.
#[derive(Debug, sqlx::FromRow)]
pub struct PlayerCode {
    pub id_jugador: i32,
    pub codigo: String,
    pub nombre: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub player_id_fbr: Option<String>,
    pub nombre_completo: Option<String>,
    pub apodo: Option<String>,
    pub fecha_nacimiento: Option<String>,
    pub pie_dominante: Option<String>,
    #[serde(default)]
    pub nacionalidades: Vec<String>,
    #[serde(default)]
    pub posiciones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInput {
    pub player_id_fbr: String,
    pub nombre_completo: String,
    pub apodo: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub pie_dominante: Option<String>,
    /// FIFA codes, de-duplicated, in the order given.
    pub nacionalidades: Vec<String>,
    /// Position codes; the first is the main position.
    pub posiciones: Vec<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CountryOption {
    pub pais_id: i32,
    pub codigo_pais: String,
    pub nombre_pais: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PositionOption {
    pub posicion_id: i32,
    pub codigo_posicion: String,
    pub nombre_posicion: String,
}
