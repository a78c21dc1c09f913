use sqlx::{PgConnection, PgPool};

use crate::models::betting::{BettableMatch, Odds, OddsInput, RoundMatch};

const ODDS_SELECT: &str = r#"
    SELECT
        c.id_cuota, c.id_partido, c.tipo_resultado, c.id_equipo, c.cuota_decimal, c.activa,
        c.fecha_actualizacion, e.NOMBRE AS nombre_equipo
    FROM cuotas_partidos c
    LEFT JOIN DIM_EQUIPO e ON c.id_equipo = e.ID_EQUIPO
"#;

const OUTCOME_ORDER: &str = r#"
    CASE c.tipo_resultado WHEN 'local' THEN 1 WHEN 'empate' THEN 2 WHEN 'visita' THEN 3 END
"#;

/// Active odds of one match, local first.
pub async fn list_active_odds(pool: &PgPool, id_partido: i32) -> Result<Vec<Odds>, sqlx::Error> {
    sqlx::query_as::<_, Odds>(&format!(
        "{} WHERE c.id_partido = $1 AND c.activa = TRUE ORDER BY {}",
        ODDS_SELECT, OUTCOME_ORDER
    ))
    .bind(id_partido)
    .fetch_all(pool)
    .await
}

/// Every odd, active or not, of the given matches.
pub async fn list_odds_for_matches(pool: &PgPool, ids: &[i32]) -> Result<Vec<Odds>, sqlx::Error> {
    sqlx::query_as::<_, Odds>(&format!(
        "{} WHERE c.id_partido = ANY($1) ORDER BY c.id_partido, {}",
        ODDS_SELECT, OUTCOME_ORDER
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// Drops the match's odds and writes the new set. Returns how many rows were written.
pub async fn replace_odds(
    conn: &mut PgConnection,
    id_partido: i32,
    odds: &[OddsInput],
) -> Result<usize, sqlx::Error> {
    sqlx::query("DELETE FROM cuotas_partidos WHERE id_partido = $1")
        .bind(id_partido)
        .execute(&mut *conn)
        .await?;

    for odd in odds {
        sqlx::query(
            r#"
            INSERT INTO cuotas_partidos (id_partido, tipo_resultado, id_equipo, cuota_decimal, activa)
            VALUES ($1, $2, $3, $4, TRUE)
            "#,
        )
        .bind(id_partido)
        .bind(odd.outcome)
        .bind(odd.id_equipo)
        .bind(odd.cuota_decimal)
        .execute(&mut *conn)
        .await?;
    }

    Ok(odds.len())
}

/// Scheduled matches with a full set of active odds, narrowed by tournament and round. With
/// `without_bets_of`, matches that user already bet on are left out.
pub async fn list_bettable_matches(
    pool: &PgPool,
    id_torneo: Option<i32>,
    numero_jornada: Option<i32>,
    without_bets_of: Option<i32>,
) -> Result<Vec<BettableMatch>, sqlx::Error> {
    sqlx::query_as::<_, BettableMatch>(
        r#"
        SELECT
            p.ID_PARTIDO, p.MATCH_ID_FBR, p.FECHA_PARTIDO, p.ESTADO_PARTIDO, p.NUMERO_JORNADA,
            t.ID_TORNEO,
            t.NOMBRE AS nombre_torneo,
            el.NOMBRE AS equipo_local,
            el.ID_EQUIPO AS id_equipo_local,
            COALESCE(el.IMAGEN, 'default-team.png') AS imagen_local,
            ev.NOMBRE AS equipo_visita,
            ev.ID_EQUIPO AS id_equipo_visita,
            COALESCE(ev.IMAGEN, 'default-team.png') AS imagen_visita,
            p.GOLES_LOCAL, p.GOLES_VISITA,
            COUNT(c.id_cuota) AS total_cuotas
        FROM HECHOS_RESULTADOS p
        INNER JOIN cuotas_partidos c ON p.ID_PARTIDO = c.id_partido AND c.activa = TRUE
        INNER JOIN DIM_TORNEO t ON p.ID_TORNEO = t.ID_TORNEO
        INNER JOIN DIM_EQUIPO el ON p.ID_EQUIPO_LOCAL = el.ID_EQUIPO
        INNER JOIN DIM_EQUIPO ev ON p.ID_EQUIPO_VISITA = ev.ID_EQUIPO
        WHERE p.ESTADO_PARTIDO = 'PROGRAMADO'
          AND ($1::INTEGER IS NULL OR p.ID_TORNEO = $1)
          AND ($2::INTEGER IS NULL OR p.NUMERO_JORNADA = $2)
          AND (
              $3::INTEGER IS NULL
              OR NOT EXISTS (
                  SELECT 1 FROM apuestas_usuarios a
                  WHERE a.id_partido = p.ID_PARTIDO AND a.id_usuario = $3
              )
          )
        GROUP BY p.ID_PARTIDO, t.ID_TORNEO, el.ID_EQUIPO, ev.ID_EQUIPO
        HAVING COUNT(c.id_cuota) = 3
        ORDER BY p.FECHA_PARTIDO, p.ID_PARTIDO
        "#,
    )
    .bind(id_torneo)
    .bind(numero_jornada)
    .bind(without_bets_of)
    .fetch_all(pool)
    .await
}

/// Matches of a tournament, all rounds when `numero_jornada` is `None`.
pub async fn list_round_matches(
    pool: &PgPool,
    id_torneo: i32,
    numero_jornada: Option<i32>,
) -> Result<Vec<RoundMatch>, sqlx::Error> {
    sqlx::query_as::<_, RoundMatch>(
        r#"
        SELECT
            p.ID_PARTIDO, p.MATCH_ID_FBR, p.FECHA_PARTIDO, p.ESTADO_PARTIDO, p.NUMERO_JORNADA,
            p.GOLES_LOCAL, p.GOLES_VISITA,
            el.NOMBRE AS equipo_local,
            el.ID_EQUIPO AS id_equipo_local,
            COALESCE(el.IMAGEN, 'default-team.png') AS imagen_local,
            ev.NOMBRE AS equipo_visita,
            ev.ID_EQUIPO AS id_equipo_visita,
            COALESCE(ev.IMAGEN, 'default-team.png') AS imagen_visita
        FROM HECHOS_RESULTADOS p
        INNER JOIN DIM_EQUIPO el ON p.ID_EQUIPO_LOCAL = el.ID_EQUIPO
        INNER JOIN DIM_EQUIPO ev ON p.ID_EQUIPO_VISITA = ev.ID_EQUIPO
        WHERE p.ID_TORNEO = $1 AND ($2::INTEGER IS NULL OR p.NUMERO_JORNADA = $2)
        ORDER BY p.FECHA_PARTIDO, p.ID_PARTIDO
        "#,
    )
    .bind(id_torneo)
    .bind(numero_jornada)
    .fetch_all(pool)
    .await
}
