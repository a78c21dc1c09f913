use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::common::deserialize_optional_i32;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Stadium {
    pub id_estadio: i32,
    pub nombre: String,
    pub capacidad: i32,
    pub ciudad: String,
    pub fecha_inauguracion: Option<NaiveDate>,
    pub superficie: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StadiumRequest {
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub capacidad: Option<i32>,
    pub ciudad: Option<String>,
    pub fecha_inauguracion: Option<String>,
    pub superficie: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StadiumInput {
    pub nombre: String,
    pub capacidad: i32,
    pub ciudad: String,
    pub fecha_inauguracion: NaiveDate,
    pub superficie: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StadiumOption {
    pub id_estadio: i32,
    pub nombre: String,
    pub ciudad: String,
    pub capacidad: i32,
}
