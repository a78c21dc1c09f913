use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};

use crate::models::tournament::{
    Country, Phase, PhaseInput, Tournament, TournamentDetail, TournamentFormat, TournamentInput,
    TournamentOption,
};

const TOURNAMENT_SELECT: &str = r#"
    SELECT
        t.ID_TORNEO, t.LEAGUE_ID_FBR, t.NOMBRE, t.PAIS_ORGANIZADOR, t.RUEDA, t.TEMPORADA,
        t.FORMATO_TORNEO, p.NOMBRE AS NOMBRE_PAIS, p.CODIGO_FIFA AS CODIGO_PAIS
    FROM DIM_TORNEO t
    LEFT JOIN DIM_PAIS p ON t.PAIS_ORGANIZADOR = p.ID_PAIS
"#;

pub async fn list_tournaments(pool: &PgPool) -> Result<Vec<TournamentDetail>, sqlx::Error> {
    let torneos = sqlx::query_as::<_, Tournament>(&format!(
        "{} ORDER BY t.TEMPORADA DESC, t.NOMBRE, t.ID_TORNEO",
        TOURNAMENT_SELECT
    ))
    .fetch_all(pool)
    .await?;

    attach_phases(pool, torneos).await
}

pub async fn find_tournament(
    pool: &PgPool,
    id_torneo: i32,
) -> Result<Option<TournamentDetail>, sqlx::Error> {
    let torneo = sqlx::query_as::<_, Tournament>(&format!(
        "{} WHERE t.ID_TORNEO = $1",
        TOURNAMENT_SELECT
    ))
    .bind(id_torneo)
    .fetch_optional(pool)
    .await?;

    match torneo {
        Some(torneo) => Ok(attach_phases(pool, vec![torneo]).await?.pop()),
        None => Ok(None),
    }
}

/// Phase tournaments get their `FASES`; round tournaments carry none.
async fn attach_phases(
    pool: &PgPool,
    torneos: Vec<Tournament>,
) -> Result<Vec<TournamentDetail>, sqlx::Error> {
    let ids: Vec<i32> = torneos
        .iter()
        .filter(|t| t.formato_torneo == TournamentFormat::Fases)
        .map(|t| t.id_torneo)
        .collect();

    let mut fases: HashMap<i32, Vec<Phase>> = HashMap::new();
    if !ids.is_empty() {
        let rows = sqlx::query_as::<_, Phase>(
            r#"
            SELECT ID_FASE, ID_TORNEO, NOMBRE_FASE, ORDEN, DESCRIPCION
            FROM DIM_FASE_TORNEO
            WHERE ID_TORNEO = ANY($1)
            ORDER BY ID_TORNEO, ORDEN
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for fase in rows {
            fases.entry(fase.id_torneo).or_default().push(fase);
        }
    }

    Ok(torneos
        .into_iter()
        .map(|torneo| {
            let fases = match torneo.formato_torneo {
                TournamentFormat::Fases => Some(fases.remove(&torneo.id_torneo).unwrap_or_default()),
                TournamentFormat::Ruedas => None,
            };
            TournamentDetail { torneo, fases }
        })
        .collect())
}

/// Duplicate check on (name, round, season, format). A missing round compares as empty.
pub async fn find_tournament_id_by_key(
    pool: &PgPool,
    input: &TournamentInput,
    excluding: Option<i32>,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT ID_TORNEO FROM DIM_TORNEO
        WHERE UPPER(NOMBRE) = UPPER($1)
          AND COALESCE(RUEDA, '') = COALESCE($2::VARCHAR, '')
          AND TEMPORADA = $3
          AND FORMATO_TORNEO = $4
          AND ($5::INTEGER IS NULL OR ID_TORNEO <> $5)
        "#,
    )
    .bind(&input.nombre)
    .bind(input.rueda.map(|r| r.as_str()))
    .bind(input.temporada)
    .bind(input.formato)
    .bind(excluding)
    .fetch_optional(pool)
    .await
}

pub async fn country_exists(pool: &PgPool, id_pais: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM DIM_PAIS WHERE ID_PAIS = $1)")
        .bind(id_pais)
        .fetch_one(pool)
        .await
}

pub async fn tournament_exists(pool: &PgPool, id_torneo: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM DIM_TORNEO WHERE ID_TORNEO = $1)")
        .bind(id_torneo)
        .fetch_one(pool)
        .await
}

pub async fn insert_tournament(
    conn: &mut PgConnection,
    input: &TournamentInput,
) -> Result<i32, sqlx::Error> {
    let league_id_fbr: i32 =
        sqlx::query_scalar("SELECT COALESCE(MAX(LEAGUE_ID_FBR), 0) + 1 FROM DIM_TORNEO")
            .fetch_one(&mut *conn)
            .await?;

    sqlx::query_scalar(
        r#"
        INSERT INTO DIM_TORNEO (LEAGUE_ID_FBR, NOMBRE, PAIS_ORGANIZADOR, RUEDA, TEMPORADA, FORMATO_TORNEO)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING ID_TORNEO
        "#,
    )
    .bind(league_id_fbr)
    .bind(&input.nombre)
    .bind(input.pais_organizador)
    .bind(input.rueda)
    .bind(input.temporada)
    .bind(input.formato)
    .fetch_one(&mut *conn)
    .await
}

pub async fn update_tournament(
    conn: &mut PgConnection,
    id_torneo: i32,
    input: &TournamentInput,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE DIM_TORNEO
        SET NOMBRE = $2, PAIS_ORGANIZADOR = $3, RUEDA = $4, TEMPORADA = $5, FORMATO_TORNEO = $6
        WHERE ID_TORNEO = $1
        "#,
    )
    .bind(id_torneo)
    .bind(&input.nombre)
    .bind(input.pais_organizador)
    .bind(input.rueda)
    .bind(input.temporada)
    .bind(input.formato)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Drops every phase and writes `fases` in order, numbered from 1.
pub async fn replace_phases(
    conn: &mut PgConnection,
    id_torneo: i32,
    fases: &[PhaseInput],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM DIM_FASE_TORNEO WHERE ID_TORNEO = $1")
        .bind(id_torneo)
        .execute(&mut *conn)
        .await?;

    for (index, fase) in fases.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO DIM_FASE_TORNEO (ID_TORNEO, NOMBRE_FASE, ORDEN, DESCRIPCION)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id_torneo)
        .bind(&fase.nombre)
        .bind(index as i32 + 1)
        .bind(&fase.descripcion)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn count_tournament_matches(pool: &PgPool, id_torneo: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM HECHOS_RESULTADOS WHERE ID_TORNEO = $1")
        .bind(id_torneo)
        .fetch_one(pool)
        .await
}

pub async fn delete_tournament(pool: &PgPool, id_torneo: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM DIM_TORNEO WHERE ID_TORNEO = $1")
        .bind(id_torneo)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_countries(pool: &PgPool) -> Result<Vec<Country>, sqlx::Error> {
    sqlx::query_as::<_, Country>("SELECT ID_PAIS, CODIGO_FIFA, NOMBRE FROM DIM_PAIS ORDER BY NOMBRE")
        .fetch_all(pool)
        .await
}

pub async fn list_tournament_options(pool: &PgPool) -> Result<Vec<TournamentOption>, sqlx::Error> {
    sqlx::query_as::<_, TournamentOption>(
        "SELECT ID_TORNEO, NOMBRE, TEMPORADA, RUEDA FROM DIM_TORNEO ORDER BY TEMPORADA DESC, NOMBRE",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_tournament_option(
    pool: &PgPool,
    id_torneo: i32,
) -> Result<Option<TournamentOption>, sqlx::Error> {
    sqlx::query_as::<_, TournamentOption>(
        "SELECT ID_TORNEO, NOMBRE, TEMPORADA, RUEDA FROM DIM_TORNEO WHERE ID_TORNEO = $1",
    )
    .bind(id_torneo)
    .fetch_optional(pool)
    .await
}
