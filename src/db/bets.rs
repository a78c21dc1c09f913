use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::betting::Outcome;
use crate::models::betting::{Bet, BetStats, BetTournament, BetView, BettorSummary};
use crate::models::matches::MatchStatus;

const BET_COLUMNS: &str = r#"
    id_apuesta, id_usuario, id_partido, id_torneo, tipo_apuesta, id_equipo_predicho,
    monto_apuesta, valor_cuota, retorno_potencial, estado, puntos_ganados, fecha_apuesta
"#;

const BET_VIEW_SELECT: &str = r#"
    SELECT
        a.id_apuesta, a.id_partido, a.tipo_apuesta, a.monto_apuesta, a.valor_cuota,
        a.retorno_potencial, a.estado, a.puntos_ganados, a.fecha_apuesta,
        p.FECHA_PARTIDO, p.NUMERO_JORNADA, p.GOLES_LOCAL, p.GOLES_VISITA, p.ESTADO_PARTIDO,
        a.id_torneo,
        t.NOMBRE AS nombre_torneo,
        el.NOMBRE AS equipo_local,
        el.IMAGEN AS imagen_local,
        ev.NOMBRE AS equipo_visita,
        ev.IMAGEN AS imagen_visita,
        ep.NOMBRE AS equipo_predicho
    FROM apuestas_usuarios a
    INNER JOIN HECHOS_RESULTADOS p ON a.id_partido = p.ID_PARTIDO
    INNER JOIN DIM_TORNEO t ON a.id_torneo = t.ID_TORNEO
    INNER JOIN DIM_EQUIPO el ON p.ID_EQUIPO_LOCAL = el.ID_EQUIPO
    INNER JOIN DIM_EQUIPO ev ON p.ID_EQUIPO_VISITA = ev.ID_EQUIPO
    LEFT JOIN DIM_EQUIPO ep ON a.id_equipo_predicho = ep.ID_EQUIPO
"#;

const STATS_SELECT: &str = r#"
    SELECT
        COUNT(*) AS total_apuestas,
        COUNT(*) FILTER (WHERE estado = 'ganada') AS apuestas_ganadas,
        COUNT(*) FILTER (WHERE estado = 'perdida') AS apuestas_perdidas,
        COUNT(*) FILTER (WHERE estado = 'pendiente') AS apuestas_pendientes,
        COALESCE(SUM(puntos_ganados), 0) AS total_puntos,
        ROUND(
            CASE WHEN COUNT(*) > 0
                THEN COUNT(*) FILTER (WHERE estado = 'ganada') * 100.0 / COUNT(*)
                ELSE 0
            END,
            2
        ) AS porcentaje_aciertos
    FROM apuestas_usuarios
"#;

/// What a bet needs to know about its match.
#[derive(Debug, sqlx::FromRow)]
pub struct BetMatch {
    pub id_partido: i32,
    pub id_torneo: i32,
    pub id_equipo_local: i32,
    pub id_equipo_visita: i32,
    pub estado_partido: MatchStatus,
}

/// A bet about to be stored, with stake and return already computed.
#[derive(Debug)]
pub struct NewBet {
    pub id_usuario: i32,
    pub id_partido: i32,
    pub id_torneo: i32,
    pub outcome: Outcome,
    pub id_equipo_predicho: Option<i32>,
    pub monto_apuesta: Decimal,
    pub valor_cuota: Decimal,
    pub retorno_potencial: Decimal,
}

pub async fn find_bet_match(
    conn: &mut PgConnection,
    id_partido: i32,
) -> Result<Option<BetMatch>, sqlx::Error> {
    sqlx::query_as::<_, BetMatch>(
        r#"
        SELECT ID_PARTIDO, ID_TORNEO, ID_EQUIPO_LOCAL, ID_EQUIPO_VISITA, ESTADO_PARTIDO
        FROM HECHOS_RESULTADOS
        WHERE ID_PARTIDO = $1
        "#,
    )
    .bind(id_partido)
    .fetch_optional(conn)
    .await
}

pub async fn user_has_bet(
    conn: &mut PgConnection,
    id_usuario: i32,
    id_partido: i32,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM apuestas_usuarios WHERE id_usuario = $1 AND id_partido = $2)",
    )
    .bind(id_usuario)
    .bind(id_partido)
    .fetch_one(conn)
    .await
}

pub async fn active_odds_value(
    conn: &mut PgConnection,
    id_partido: i32,
    outcome: Outcome,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT cuota_decimal FROM cuotas_partidos
        WHERE id_partido = $1 AND tipo_resultado = $2 AND activa = TRUE
        "#,
    )
    .bind(id_partido)
    .bind(outcome)
    .fetch_optional(conn)
    .await
}

pub async fn insert_bet(conn: &mut PgConnection, bet: &NewBet) -> Result<Bet, sqlx::Error> {
    sqlx::query_as::<_, Bet>(&format!(
        r#"
        INSERT INTO apuestas_usuarios (
            id_usuario, id_partido, id_torneo, tipo_apuesta, id_equipo_predicho,
            monto_apuesta, valor_cuota, retorno_potencial, estado
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pendiente')
        RETURNING {}
        "#,
        BET_COLUMNS
    ))
    .bind(bet.id_usuario)
    .bind(bet.id_partido)
    .bind(bet.id_torneo)
    .bind(bet.outcome.as_str())
    .bind(bet.id_equipo_predicho)
    .bind(bet.monto_apuesta)
    .bind(bet.valor_cuota)
    .bind(bet.retorno_potencial)
    .fetch_one(conn)
    .await
}

/// The caller's bets, optionally narrowed by status, tournament and round.
pub async fn list_user_bets(
    pool: &PgPool,
    id_usuario: i32,
    estado: Option<&str>,
    id_torneo: Option<i32>,
    numero_jornada: Option<i32>,
) -> Result<Vec<BetView>, sqlx::Error> {
    sqlx::query_as::<_, BetView>(&format!(
        r#"
        {}
        WHERE a.id_usuario = $1
          AND ($2::VARCHAR IS NULL OR a.estado = $2)
          AND ($3::INTEGER IS NULL OR a.id_torneo = $3)
          AND ($4::INTEGER IS NULL OR p.NUMERO_JORNADA = $4)
        ORDER BY p.NUMERO_JORNADA NULLS LAST, p.FECHA_PARTIDO, a.id_apuesta
        "#,
        BET_VIEW_SELECT
    ))
    .bind(id_usuario)
    .bind(estado)
    .bind(id_torneo)
    .bind(numero_jornada)
    .fetch_all(pool)
    .await
}

pub async fn user_stats(pool: &PgPool, id_usuario: i32) -> Result<BetStats, sqlx::Error> {
    sqlx::query_as::<_, BetStats>(&format!("{} WHERE id_usuario = $1", STATS_SELECT))
        .bind(id_usuario)
        .fetch_one(pool)
        .await
}

pub async fn user_tournament_stats(
    pool: &PgPool,
    id_usuario: i32,
    id_torneo: i32,
) -> Result<BetStats, sqlx::Error> {
    sqlx::query_as::<_, BetStats>(&format!(
        "{} WHERE id_usuario = $1 AND id_torneo = $2",
        STATS_SELECT
    ))
    .bind(id_usuario)
    .bind(id_torneo)
    .fetch_one(pool)
    .await
}

/// Tournaments the user has bet in, newest season first.
pub async fn user_bet_tournaments(
    pool: &PgPool,
    id_usuario: i32,
) -> Result<Vec<BetTournament>, sqlx::Error> {
    sqlx::query_as::<_, BetTournament>(
        r#"
        SELECT DISTINCT t.ID_TORNEO, t.NOMBRE, t.TEMPORADA, t.RUEDA, t.FORMATO_TORNEO
        FROM apuestas_usuarios a
        INNER JOIN DIM_TORNEO t ON a.id_torneo = t.ID_TORNEO
        WHERE a.id_usuario = $1
        ORDER BY t.TEMPORADA DESC, t.NOMBRE
        "#,
    )
    .bind(id_usuario)
    .fetch_all(pool)
    .await
}

/// `(tournament, round)` pairs the user has bet in.
pub async fn user_bet_rounds(pool: &PgPool, id_usuario: i32) -> Result<Vec<(i32, i32)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT DISTINCT a.id_torneo, p.NUMERO_JORNADA
        FROM apuestas_usuarios a
        INNER JOIN HECHOS_RESULTADOS p ON a.id_partido = p.ID_PARTIDO
        WHERE a.id_usuario = $1 AND p.NUMERO_JORNADA IS NOT NULL
        ORDER BY a.id_torneo, p.NUMERO_JORNADA
        "#,
    )
    .bind(id_usuario)
    .fetch_all(pool)
    .await
}

/// Active regular users; admins do not bet.
pub async fn list_bettors(pool: &PgPool) -> Result<Vec<BettorSummary>, sqlx::Error> {
    sqlx::query_as::<_, BettorSummary>(
        r#"
        SELECT id_usuario, username, email, nombre_completo, fecha_creacion
        FROM usuarios
        WHERE role = 'usuario' AND activo = TRUE
        ORDER BY username
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn user_tournament_bets(
    pool: &PgPool,
    id_usuario: i32,
    id_torneo: i32,
) -> Result<Vec<BetView>, sqlx::Error> {
    sqlx::query_as::<_, BetView>(&format!(
        r#"
        {}
        WHERE a.id_usuario = $1 AND a.id_torneo = $2
        ORDER BY p.FECHA_PARTIDO DESC, a.id_apuesta DESC
        "#,
        BET_VIEW_SELECT
    ))
    .bind(id_usuario)
    .bind(id_torneo)
    .fetch_all(pool)
    .await
}

pub async fn find_username(pool: &PgPool, id_usuario: i32) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT username FROM usuarios WHERE id_usuario = $1")
        .bind(id_usuario)
        .fetch_optional(pool)
        .await
}

/// Deleted ledger rows and deleted bets, in that order.
pub async fn delete_user_tournament_bets(
    conn: &mut PgConnection,
    id_usuario: i32,
    id_torneo: i32,
    numero_jornada: Option<i32>,
) -> Result<(u64, u64), sqlx::Error> {
    let puntos = sqlx::query(
        r#"
        DELETE FROM historial_puntos h
        USING HECHOS_RESULTADOS p
        WHERE h.id_partido = p.ID_PARTIDO
          AND h.id_usuario = $1
          AND h.id_torneo = $2
          AND ($3::INTEGER IS NULL OR p.NUMERO_JORNADA = $3)
        "#,
    )
    .bind(id_usuario)
    .bind(id_torneo)
    .bind(numero_jornada)
    .execute(&mut *conn)
    .await?;

    let apuestas = sqlx::query(
        r#"
        DELETE FROM apuestas_usuarios a
        USING HECHOS_RESULTADOS p
        WHERE a.id_partido = p.ID_PARTIDO
          AND a.id_usuario = $1
          AND a.id_torneo = $2
          AND ($3::INTEGER IS NULL OR p.NUMERO_JORNADA = $3)
        "#,
    )
    .bind(id_usuario)
    .bind(id_torneo)
    .bind(numero_jornada)
    .execute(&mut *conn)
    .await?;

    Ok((puntos.rows_affected(), apuestas.rows_affected()))
}
