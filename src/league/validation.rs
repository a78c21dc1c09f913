use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::betting::stake::MIN_ODDS_EXCLUSIVE;
use crate::betting::Outcome;
use crate::errors::ApiError;
use crate::models::betting::{BetInput, OddsInput, OddsItem};
use crate::models::matches::{MatchInput, MatchRequest, MatchStatus};
use crate::models::player::{PlayerInput, PlayerRequest};
use crate::models::stadium::{StadiumInput, StadiumRequest};
use crate::models::team::{TeamInput, TeamRequest};
use crate::models::tournament::{
    PhaseInput, Round, TournamentFormat, TournamentInput, TournamentRequest,
};
use crate::utils::text::normalize_upper;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Centralized validation for everything the admin screens and the betting screens submit
pub struct LeagueValidator;

impl LeagueValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate team create/update request
    pub fn validate_team(&self, request: &TeamRequest, today: NaiveDate) -> Result<TeamInput, ApiError> {
        let nombre = normalize_upper(request.nombre.as_deref());
        let ciudad = normalize_upper(request.ciudad.as_deref());
        let (nombre, ciudad) = match (nombre, ciudad) {
            (Some(nombre), Some(ciudad)) => (nombre, ciudad),
            _ => return Err(ApiError::validation("El nombre y la ciudad son obligatorios")),
        };

        let fecha_fundacion = self.parse_optional_date(request.fecha_fundacion.as_deref())?;
        if let Some(fecha) = fecha_fundacion {
            if fecha > today {
                return Err(ApiError::validation("La fecha de fundación no puede ser futura"));
            }
        }

        Ok(TeamInput {
            nombre,
            apodo: normalize_upper(request.apodo.as_deref()),
            ciudad,
            fecha_fundacion,
        })
    }

    /// Validate stadium create/update request
    pub fn validate_stadium(&self, request: &StadiumRequest) -> Result<StadiumInput, ApiError> {
        let nombre = normalize_upper(request.nombre.as_deref());
        let ciudad = normalize_upper(request.ciudad.as_deref());
        let superficie = normalize_upper(request.superficie.as_deref());
        let fecha = request
            .fecha_inauguracion
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());

        let (nombre, capacidad, ciudad, fecha, superficie) =
            match (nombre, request.capacidad, ciudad, fecha, superficie) {
                (Some(n), Some(c), Some(ci), Some(f), Some(s)) => (n, c, ci, f, s),
                _ => return Err(ApiError::validation("Todos los campos son obligatorios")),
            };

        if capacidad <= 0 {
            return Err(ApiError::validation("La capacidad debe ser un número positivo"));
        }

        Ok(StadiumInput {
            nombre,
            capacidad,
            ciudad,
            fecha_inauguracion: self.parse_date(fecha)?,
            superficie,
        })
    }

    /// Validate player create/update request. Relation codes are upper-cased and de-duplicated.
    pub fn validate_player(&self, request: &PlayerRequest) -> Result<PlayerInput, ApiError> {
        let nombre_completo = normalize_upper(request.nombre_completo.as_deref())
            .ok_or_else(|| ApiError::validation("El nombre completo es obligatorio"))?;
        let player_id_fbr = request
            .player_id_fbr
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation("El player_id_fbr es obligatorio"))?;

        Ok(PlayerInput {
            player_id_fbr,
            nombre_completo,
            apodo: normalize_upper(request.apodo.as_deref()),
            fecha_nacimiento: self.parse_optional_date(request.fecha_nacimiento.as_deref())?,
            pie_dominante: normalize_upper(request.pie_dominante.as_deref()),
            nacionalidades: unique_codes(&request.nacionalidades),
            posiciones: unique_codes(&request.posiciones),
        })
    }

    /// Validate tournament create/update request
    pub fn validate_tournament(&self, request: &TournamentRequest) -> Result<TournamentInput, ApiError> {
        let nombre = normalize_upper(request.nombre.as_deref());
        let formato = request
            .formato_torneo
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());
        let (nombre, temporada, formato) = match (nombre, request.temporada, formato) {
            (Some(n), Some(t), Some(f)) => (n, t, f),
            _ => {
                return Err(ApiError::validation(
                    "Los campos nombre, temporada y formato de torneo son obligatorios",
                ))
            }
        };

        if !(1900..=2100).contains(&temporada) {
            return Err(ApiError::validation("La temporada no es válida"));
        }

        let formato: TournamentFormat = formato.parse().map_err(ApiError::Validation)?;

        let rueda = match request.rueda.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => Some(raw.parse::<Round>().map_err(ApiError::Validation)?),
            None => None,
        };

        let fases = match formato {
            TournamentFormat::Ruedas => {
                if rueda.is_none() {
                    return Err(ApiError::validation(
                        "Para torneos con formato RUEDAS, debe especificar la rueda",
                    ));
                }
                Vec::new()
            }
            TournamentFormat::Fases => {
                let fases: Vec<PhaseInput> = request
                    .fases
                    .iter()
                    .filter_map(|fase| {
                        normalize_upper(fase.nombre.as_deref()).map(|nombre| PhaseInput {
                            nombre,
                            descripcion: fase
                                .descripcion
                                .as_deref()
                                .map(str::trim)
                                .filter(|d| !d.is_empty())
                                .map(str::to_string),
                        })
                    })
                    .collect();
                if fases.is_empty() {
                    return Err(ApiError::validation(
                        "Para torneos con formato FASES, debe especificar al menos una fase",
                    ));
                }
                fases
            }
        };

        Ok(TournamentInput {
            nombre,
            pais_organizador: request.pais_organizador,
            // A phase tournament has no round.
            rueda: if formato == TournamentFormat::Fases { None } else { rueda },
            temporada,
            formato,
            fases,
        })
    }

    /// Validate match create/update request
    pub fn validate_match(&self, request: &MatchRequest) -> Result<MatchInput, ApiError> {
        let fecha = request
            .fecha_partido
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());

        let (match_id_fbr, id_torneo, fecha, local, visita, id_estadio) = match (
            request.match_id_fbr.clone(),
            request.id_torneo,
            fecha,
            request.id_equipo_local,
            request.id_equipo_visita,
            request.id_estadio,
        ) {
            (Some(m), Some(t), Some(f), Some(l), Some(v), Some(e)) => (m, t, f, l, v, e),
            _ => {
                return Err(ApiError::validation(
                    "Los campos matchIdFbr, idTorneo, fechaPartido, equipos y estadio son obligatorios",
                ))
            }
        };

        if local == visita {
            return Err(ApiError::validation(
                "El equipo local y visitante deben ser diferentes",
            ));
        }

        for goles in [request.goles_local, request.goles_visita].into_iter().flatten() {
            if goles < 0 {
                return Err(ApiError::validation("Los goles no pueden ser negativos"));
            }
        }
        if matches!(request.asistencia, Some(a) if a < 0) {
            return Err(ApiError::validation("La asistencia no puede ser negativa"));
        }
        if matches!(request.numero_jornada, Some(j) if j <= 0) {
            return Err(ApiError::validation("El número de jornada debe ser positivo"));
        }

        let estado_partido = match request
            .estado_partido
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(raw) => raw.parse::<MatchStatus>().map_err(ApiError::Validation)?,
            None => MatchStatus::default(),
        };

        let fecha_partido = self.parse_match_datetime(fecha)?;

        Ok(MatchInput {
            match_id_fbr,
            id_torneo,
            fecha_torneo: tournament_day(fecha_partido.date()),
            fecha_partido,
            numero_jornada: request.numero_jornada,
            id_equipo_local: local,
            id_equipo_visita: visita,
            id_estadio,
            goles_local: request.goles_local,
            goles_visita: request.goles_visita,
            es_campo_neutro: request.es_campo_neutro.unwrap_or(false),
            arbitro: normalize_upper(request.arbitro.as_deref()),
            asistencia: request.asistencia,
            clima: normalize_upper(request.clima.as_deref()),
            estado_partido,
        })
    }

    /// Validate the odds set for a match: one odd per outcome, each above 1.00
    pub fn validate_odds(&self, items: &[OddsItem]) -> Result<Vec<OddsInput>, ApiError> {
        if items.len() != Outcome::ALL.len() {
            return Err(ApiError::validation(
                "Debe proporcionar exactamente 3 cuotas (local, empate, visita)",
            ));
        }

        let mut seen = HashSet::new();
        let mut odds = Vec::with_capacity(items.len());
        for item in items {
            let outcome = item
                .tipo_resultado
                .as_deref()
                .and_then(Outcome::parse_normalized)
                .filter(|outcome| seen.insert(*outcome))
                .ok_or_else(|| {
                    ApiError::validation(
                        "Debe proporcionar una cuota para cada tipo: local, empate, visita",
                    )
                })?;

            let cuota_decimal = match item.cuota_decimal {
                Some(cuota) if cuota > MIN_ODDS_EXCLUSIVE => cuota,
                _ => {
                    return Err(ApiError::validation(format!(
                        "La cuota para {} debe ser mayor a 1.00",
                        outcome
                    )))
                }
            };

            odds.push(OddsInput {
                outcome,
                id_equipo: item.id_equipo,
                cuota_decimal: cuota_decimal.round_dp(2),
            });
        }

        odds.sort_by_key(|o| Outcome::ALL.iter().position(|x| *x == o.outcome));
        Ok(odds)
    }

    /// Validate a single bet before it is checked against the match and its odds
    pub fn validate_bet(
        &self,
        id_partido: Option<i32>,
        tipo_apuesta: Option<&str>,
        id_equipo_predicho: Option<i32>,
    ) -> Result<BetInput, ApiError> {
        let tipo = tipo_apuesta.map(str::trim).filter(|t| !t.is_empty());
        let (id_partido, tipo) = match (id_partido, tipo) {
            (Some(id), Some(tipo)) => (id, tipo),
            _ => {
                return Err(ApiError::validation(
                    "id_partido y tipo_apuesta son requeridos",
                ))
            }
        };

        let outcome = Outcome::parse_normalized(tipo).ok_or_else(|| {
            ApiError::validation("tipo_apuesta debe ser: local, empate o visita")
        })?;

        let id_equipo_predicho = match outcome {
            Outcome::Draw => None,
            Outcome::Home | Outcome::Away => Some(id_equipo_predicho.ok_or_else(|| {
                ApiError::validation(
                    "id_equipo_predicho es requerido para apuestas de local/visita",
                )
            })?),
        };

        Ok(BetInput {
            id_partido,
            outcome,
            id_equipo_predicho,
        })
    }

    /// Validate pagination parameters
    pub fn validate_pagination(&self, limit: Option<i64>, offset: Option<i64>) -> Result<(i64, i64), ApiError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = offset.unwrap_or(0);

        if limit < 1 {
            return Err(ApiError::validation("El límite debe ser positivo"));
        }

        if limit > MAX_PAGE_SIZE {
            return Err(ApiError::validation(format!(
                "El límite máximo es {}",
                MAX_PAGE_SIZE
            )));
        }

        if offset < 0 {
            return Err(ApiError::validation("El offset no puede ser negativo"));
        }

        Ok((limit, offset))
    }

    /// Parse a `YYYY-MM-DD` date, also accepting a full timestamp and keeping its date part
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate, ApiError> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| self.parse_match_datetime(raw).map(|dt| dt.date()))
            .map_err(|_| ApiError::validation(format!("Fecha inválida: {}", raw)))
    }

    fn parse_optional_date(&self, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => self.parse_date(raw).map(Some),
            None => Ok(None),
        }
    }

    /// Parse the kick-off time as typed in the form. RFC 3339 keeps its wall-clock time; a bare
    /// date means midnight.
    pub fn parse_match_datetime(&self, raw: &str) -> Result<NaiveDateTime, ApiError> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.naive_local());
        }
        for format in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(dt);
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| ApiError::validation(format!("Fecha de partido inválida: {}", raw)))
    }
}

impl Default for LeagueValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// `YYYYMMDD` as an integer, the form stored in `FECHA_TORNEO`.
pub fn tournament_day(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

fn unique_codes(codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .iter()
        .filter_map(|code| normalize_upper(Some(code)))
        .filter(|code| seen.insert(code.clone()))
        .collect()
}
