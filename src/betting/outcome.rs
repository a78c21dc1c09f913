use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Result of a match from the home side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum Outcome {
    #[serde(rename = "local")]
    #[sqlx(rename = "local")]
    Home,
    #[serde(rename = "empate")]
    #[sqlx(rename = "empate")]
    Draw,
    #[serde(rename = "visita")]
    #[sqlx(rename = "visita")]
    Away,
}

impl Outcome {
    /// Display order used by every odds listing.
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Home => "local",
            Outcome::Draw => "empate",
            Outcome::Away => "visita",
        }
    }

    /// A 0-0 is a draw like any other level score.
    pub fn from_score(home_goals: i32, away_goals: i32) -> Self {
        match home_goals.cmp(&away_goals) {
            Ordering::Greater => Outcome::Home,
            Ordering::Less => Outcome::Away,
            Ordering::Equal => Outcome::Draw,
        }
    }

    /// Lenient parse for values read back from storage: surrounding whitespace and case are ignored.
    pub fn parse_normalized(raw: &str) -> Option<Self> {
        raw.trim().to_lowercase().parse().ok()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not one of local, empate, visita")]
pub struct UnknownOutcome(pub String);

impl FromStr for Outcome {
    type Err = UnknownOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Outcome::Home),
            "empate" => Ok(Outcome::Draw),
            "visita" => Ok(Outcome::Away),
            other => Err(UnknownOutcome(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pendiente,
    Ganada,
    Perdida,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pendiente => "pendiente",
            BetStatus::Ganada => "ganada",
            BetStatus::Perdida => "perdida",
        }
    }
}

impl FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(BetStatus::Pendiente),
            "ganada" => Ok(BetStatus::Ganada),
            "perdida" => Ok(BetStatus::Perdida),
            other => Err(format!("'{}' is not one of pendiente, ganada, perdida", other)),
        }
    }
}
