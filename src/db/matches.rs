use chrono::{Duration, NaiveDate};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::models::matches::{MatchInput, MatchStatus, MatchView};

const MATCH_VIEW_SELECT: &str = r#"
    SELECT
        r.ID_PARTIDO, r.MATCH_ID_FBR, r.ID_TORNEO, r.FECHA_PARTIDO, r.FECHA_TORNEO, r.NUMERO_JORNADA,
        r.ID_EQUIPO_LOCAL, r.ID_EQUIPO_VISITA, r.ID_ESTADIO, r.GOLES_LOCAL, r.GOLES_VISITA,
        r.ES_CAMPO_NEUTRO, r.ARBITRO, r.ASISTENCIA, r.CLIMA, r.ESTADO_PARTIDO, r.FECHA_LIQUIDACION,
        t.NOMBRE AS NOMBRE_TORNEO,
        t.TEMPORADA,
        el.NOMBRE AS NOMBRE_EQUIPO_LOCAL,
        el.APODO AS APODO_EQUIPO_LOCAL,
        COALESCE(el.IMAGEN, 'default-team.png') AS IMAGEN_EQUIPO_LOCAL,
        ev.NOMBRE AS NOMBRE_EQUIPO_VISITA,
        ev.APODO AS APODO_EQUIPO_VISITA,
        COALESCE(ev.IMAGEN, 'default-team.png') AS IMAGEN_EQUIPO_VISITA,
        e.NOMBRE AS NOMBRE_ESTADIO,
        e.CIUDAD AS CIUDAD_ESTADIO
    FROM HECHOS_RESULTADOS r
    INNER JOIN DIM_TORNEO t ON r.ID_TORNEO = t.ID_TORNEO
    INNER JOIN DIM_EQUIPO el ON r.ID_EQUIPO_LOCAL = el.ID_EQUIPO
    INNER JOIN DIM_EQUIPO ev ON r.ID_EQUIPO_VISITA = ev.ID_EQUIPO
    INNER JOIN DIM_ESTADIO e ON r.ID_ESTADIO = e.ID_ESTADIO
"#;

/// Parsed list filters. Dates are inclusive on both ends.
#[derive(Debug, Default)]
pub struct MatchQuery {
    pub torneo_id: Option<i32>,
    pub equipo_id: Option<i32>,
    pub estado: Option<MatchStatus>,
    pub numero_jornada: Option<i32>,
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_matches(pool: &PgPool, query: &MatchQuery) -> Result<Vec<MatchView>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(MATCH_VIEW_SELECT);
    builder.push(" WHERE 1 = 1");

    if let Some(torneo_id) = query.torneo_id {
        builder.push(" AND r.ID_TORNEO = ").push_bind(torneo_id);
    }
    if let Some(equipo_id) = query.equipo_id {
        builder
            .push(" AND (r.ID_EQUIPO_LOCAL = ")
            .push_bind(equipo_id)
            .push(" OR r.ID_EQUIPO_VISITA = ")
            .push_bind(equipo_id)
            .push(")");
    }
    if let Some(estado) = query.estado {
        builder.push(" AND r.ESTADO_PARTIDO = ").push_bind(estado);
    }
    if let Some(jornada) = query.numero_jornada {
        builder.push(" AND r.NUMERO_JORNADA = ").push_bind(jornada);
    }
    if let Some(desde) = query.fecha_desde {
        builder
            .push(" AND r.FECHA_PARTIDO >= ")
            .push_bind(desde.and_time(chrono::NaiveTime::MIN));
    }
    if let Some(hasta) = query.fecha_hasta {
        let next_day = hasta + Duration::days(1);
        builder
            .push(" AND r.FECHA_PARTIDO < ")
            .push_bind(next_day.and_time(chrono::NaiveTime::MIN));
    }

    builder
        .push(" ORDER BY r.NUMERO_JORNADA NULLS LAST, r.FECHA_PARTIDO, r.ID_PARTIDO LIMIT ")
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.offset);

    builder.build_query_as::<MatchView>().fetch_all(pool).await
}

pub async fn find_match(pool: &PgPool, id_partido: i32) -> Result<Option<MatchView>, sqlx::Error> {
    sqlx::query_as::<_, MatchView>(&format!("{} WHERE r.ID_PARTIDO = $1", MATCH_VIEW_SELECT))
        .bind(id_partido)
        .fetch_optional(pool)
        .await
}

pub async fn find_match_id_by_fbr(
    pool: &PgPool,
    match_id_fbr: &str,
    excluding: Option<i32>,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT ID_PARTIDO FROM HECHOS_RESULTADOS
        WHERE MATCH_ID_FBR = $1 AND ($2::INTEGER IS NULL OR ID_PARTIDO <> $2)
        "#,
    )
    .bind(match_id_fbr)
    .bind(excluding)
    .fetch_optional(pool)
    .await
}

pub async fn match_exists(pool: &PgPool, id_partido: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM HECHOS_RESULTADOS WHERE ID_PARTIDO = $1)")
        .bind(id_partido)
        .fetch_one(pool)
        .await
}

pub async fn insert_match(pool: &PgPool, input: &MatchInput) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO HECHOS_RESULTADOS (
            MATCH_ID_FBR, ID_TORNEO, FECHA_PARTIDO, FECHA_TORNEO, NUMERO_JORNADA,
            ID_EQUIPO_LOCAL, ID_EQUIPO_VISITA, ID_ESTADIO, GOLES_LOCAL, GOLES_VISITA,
            ES_CAMPO_NEUTRO, ARBITRO, ASISTENCIA, CLIMA, ESTADO_PARTIDO
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING ID_PARTIDO
        "#,
    )
    .bind(&input.match_id_fbr)
    .bind(input.id_torneo)
    .bind(input.fecha_partido)
    .bind(input.fecha_torneo)
    .bind(input.numero_jornada)
    .bind(input.id_equipo_local)
    .bind(input.id_equipo_visita)
    .bind(input.id_estadio)
    .bind(input.goles_local)
    .bind(input.goles_visita)
    .bind(input.es_campo_neutro)
    .bind(&input.arbitro)
    .bind(input.asistencia)
    .bind(&input.clima)
    .bind(input.estado_partido)
    .fetch_one(pool)
    .await
}

/// Runs inside the caller's transaction so a triggered settlement commits with it.
///
/// Any status other than `FINALIZADO` clears the settlement stamp: bets taken after a reopen are
/// settled on the next finish.
pub async fn update_match(
    conn: &mut PgConnection,
    id_partido: i32,
    input: &MatchInput,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE HECHOS_RESULTADOS
        SET MATCH_ID_FBR = $2, ID_TORNEO = $3, FECHA_PARTIDO = $4, FECHA_TORNEO = $5,
            NUMERO_JORNADA = $6, ID_EQUIPO_LOCAL = $7, ID_EQUIPO_VISITA = $8, ID_ESTADIO = $9,
            GOLES_LOCAL = $10, GOLES_VISITA = $11, ES_CAMPO_NEUTRO = $12, ARBITRO = $13,
            ASISTENCIA = $14, CLIMA = $15, ESTADO_PARTIDO = $16,
            FECHA_LIQUIDACION = CASE
                WHEN $16::VARCHAR = 'FINALIZADO' THEN FECHA_LIQUIDACION
                ELSE NULL
            END
        WHERE ID_PARTIDO = $1
        "#,
    )
    .bind(id_partido)
    .bind(&input.match_id_fbr)
    .bind(input.id_torneo)
    .bind(input.fecha_partido)
    .bind(input.fecha_torneo)
    .bind(input.numero_jornada)
    .bind(input.id_equipo_local)
    .bind(input.id_equipo_visita)
    .bind(input.id_estadio)
    .bind(input.goles_local)
    .bind(input.goles_visita)
    .bind(input.es_campo_neutro)
    .bind(&input.arbitro)
    .bind(input.asistencia)
    .bind(&input.clima)
    .bind(input.estado_partido)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Statistics and bets pin a match; odds are removed with it.
pub async fn count_match_references(pool: &PgPool, id_partido: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT
            (SELECT COUNT(*) FROM HECHOS_ESTADISTICAS WHERE ID_PARTIDO = $1)
          + (SELECT COUNT(*) FROM apuestas_usuarios WHERE id_partido = $1)
        "#,
    )
    .bind(id_partido)
    .fetch_one(pool)
    .await
}

pub async fn delete_match(pool: &PgPool, id_partido: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM HECHOS_RESULTADOS WHERE ID_PARTIDO = $1")
        .bind(id_partido)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
