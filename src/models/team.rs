use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Team {
    pub id_equipo: i32,
    pub team_id_fbr: Option<String>,
    pub nombre: String,
    pub apodo: Option<String>,
    pub ciudad: Option<String>,
    pub fecha_fundacion: Option<NaiveDate>,
    pub imagen: Option<String>,
}

/// Body of `POST /api/equipos` and `PUT /api/equipos/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRequest {
    pub nombre: Option<String>,
    pub apodo: Option<String>,
    pub ciudad: Option<String>,
    pub fecha_fundacion: Option<String>,
}

/// A validated team, text already upper-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamInput {
    pub nombre: String,
    pub apodo: Option<String>,
    pub ciudad: String,
    pub fecha_fundacion: Option<NaiveDate>,
}

/// Short team entry used by the match form selects.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TeamOption {
    pub id_equipo: i32,
    pub nombre: String,
    pub apodo: Option<String>,
    pub ciudad: Option<String>,
}
