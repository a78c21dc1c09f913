use sqlx::PgPool;

use crate::models::betting::{PredictedMatch, PredictionTournament, PredictionView, RoundActivity};

/// Every user's bets in the given tournament and round; `None` means no filter.
pub async fn predictions(
    pool: &PgPool,
    id_torneo: Option<i32>,
    numero_jornada: Option<i32>,
) -> Result<Vec<PredictionView>, sqlx::Error> {
    sqlx::query_as::<_, PredictionView>(
        r#"
        SELECT
            u.id_usuario, u.username, u.nombre_completo,
            a.tipo_apuesta, a.valor_cuota, a.retorno_potencial, a.estado, a.puntos_ganados,
            a.fecha_apuesta,
            p.ID_PARTIDO, p.NUMERO_JORNADA, p.FECHA_PARTIDO, p.GOLES_LOCAL, p.GOLES_VISITA,
            p.ESTADO_PARTIDO,
            t.NOMBRE AS nombre_torneo,
            t.TEMPORADA,
            el.NOMBRE AS equipo_local,
            ev.NOMBRE AS equipo_visita,
            ep.NOMBRE AS equipo_predicho
        FROM apuestas_usuarios a
        INNER JOIN usuarios u ON a.id_usuario = u.id_usuario
        INNER JOIN HECHOS_RESULTADOS p ON a.id_partido = p.ID_PARTIDO
        INNER JOIN DIM_TORNEO t ON a.id_torneo = t.ID_TORNEO
        INNER JOIN DIM_EQUIPO el ON p.ID_EQUIPO_LOCAL = el.ID_EQUIPO
        INNER JOIN DIM_EQUIPO ev ON p.ID_EQUIPO_VISITA = ev.ID_EQUIPO
        LEFT JOIN DIM_EQUIPO ep ON a.id_equipo_predicho = ep.ID_EQUIPO
        WHERE ($1::INTEGER IS NULL OR a.id_torneo = $1)
          AND ($2::INTEGER IS NULL OR p.NUMERO_JORNADA = $2)
        ORDER BY p.FECHA_PARTIDO, p.ID_PARTIDO, a.fecha_apuesta, u.username
        "#,
    )
    .bind(id_torneo)
    .bind(numero_jornada)
    .fetch_all(pool)
    .await
}

/// Matches with at least one bet, in kick-off order.
pub async fn predicted_matches(
    pool: &PgPool,
    id_torneo: Option<i32>,
    numero_jornada: Option<i32>,
) -> Result<Vec<PredictedMatch>, sqlx::Error> {
    sqlx::query_as::<_, PredictedMatch>(
        r#"
        SELECT
            p.ID_PARTIDO, p.MATCH_ID_FBR, p.FECHA_PARTIDO, p.ESTADO_PARTIDO, p.NUMERO_JORNADA,
            p.GOLES_LOCAL, p.GOLES_VISITA,
            el.NOMBRE AS equipo_local,
            el.ID_EQUIPO AS id_equipo_local,
            COALESCE(el.IMAGEN, 'default-team.png') AS imagen_local,
            ev.NOMBRE AS equipo_visita,
            ev.ID_EQUIPO AS id_equipo_visita,
            COALESCE(ev.IMAGEN, 'default-team.png') AS imagen_visita,
            t.NOMBRE AS nombre_torneo,
            t.TEMPORADA
        FROM HECHOS_RESULTADOS p
        INNER JOIN DIM_TORNEO t ON p.ID_TORNEO = t.ID_TORNEO
        INNER JOIN DIM_EQUIPO el ON p.ID_EQUIPO_LOCAL = el.ID_EQUIPO
        INNER JOIN DIM_EQUIPO ev ON p.ID_EQUIPO_VISITA = ev.ID_EQUIPO
        WHERE EXISTS (SELECT 1 FROM apuestas_usuarios a WHERE a.id_partido = p.ID_PARTIDO)
          AND ($1::INTEGER IS NULL OR p.ID_TORNEO = $1)
          AND ($2::INTEGER IS NULL OR p.NUMERO_JORNADA = $2)
        ORDER BY p.FECHA_PARTIDO, p.ID_PARTIDO
        "#,
    )
    .bind(id_torneo)
    .bind(numero_jornada)
    .fetch_all(pool)
    .await
}

pub async fn tournaments_with_bets(pool: &PgPool) -> Result<Vec<PredictionTournament>, sqlx::Error> {
    sqlx::query_as::<_, PredictionTournament>(
        r#"
        SELECT t.ID_TORNEO, t.NOMBRE, t.TEMPORADA, t.RUEDA, COUNT(a.id_apuesta) AS total_apuestas
        FROM DIM_TORNEO t
        INNER JOIN apuestas_usuarios a ON a.id_torneo = t.ID_TORNEO
        GROUP BY t.ID_TORNEO, t.NOMBRE, t.TEMPORADA, t.RUEDA
        ORDER BY t.TEMPORADA DESC, t.NOMBRE, t.RUEDA
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Rounds of a tournament with their match and bet counts. Matches without a round are left out.
pub async fn tournament_round_activity(
    pool: &PgPool,
    id_torneo: i32,
) -> Result<Vec<RoundActivity>, sqlx::Error> {
    sqlx::query_as::<_, RoundActivity>(
        r#"
        SELECT
            p.NUMERO_JORNADA AS fecha,
            COUNT(DISTINCT p.ID_PARTIDO) AS total_partidos,
            COUNT(a.id_apuesta) AS total_apuestas
        FROM HECHOS_RESULTADOS p
        LEFT JOIN apuestas_usuarios a ON a.id_partido = p.ID_PARTIDO
        WHERE p.ID_TORNEO = $1 AND p.NUMERO_JORNADA IS NOT NULL
        GROUP BY p.NUMERO_JORNADA
        ORDER BY p.NUMERO_JORNADA
        "#,
    )
    .bind(id_torneo)
    .fetch_all(pool)
    .await
}

/// Tournament and round of the latest match that has bets.
pub async fn latest_bet_round(
    pool: &PgPool,
    id_torneo: Option<i32>,
) -> Result<Option<(i32, i32)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT p.ID_TORNEO, p.NUMERO_JORNADA
        FROM HECHOS_RESULTADOS p
        WHERE p.NUMERO_JORNADA IS NOT NULL
          AND EXISTS (SELECT 1 FROM apuestas_usuarios a WHERE a.id_partido = p.ID_PARTIDO)
          AND ($1::INTEGER IS NULL OR p.ID_TORNEO = $1)
        ORDER BY p.FECHA_PARTIDO DESC, p.NUMERO_JORNADA DESC
        LIMIT 1
        "#,
    )
    .bind(id_torneo)
    .fetch_optional(pool)
    .await
}
