use sqlx::PgPool;

use crate::models::team::{Team, TeamInput, TeamOption};

const TEAM_COLUMNS: &str =
    "ID_EQUIPO, TEAM_ID_FBR, NOMBRE, APODO, CIUDAD, FECHA_FUNDACION, IMAGEN";

pub async fn list_teams(pool: &PgPool) -> Result<Vec<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(&format!(
        "SELECT {} FROM DIM_EQUIPO ORDER BY NOMBRE",
        TEAM_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_team(pool: &PgPool, id_equipo: i32) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(&format!(
        "SELECT {} FROM DIM_EQUIPO WHERE ID_EQUIPO = $1",
        TEAM_COLUMNS
    ))
    .bind(id_equipo)
    .fetch_optional(pool)
    .await
}

/// Names are stored upper-cased, so comparing upper-cased text is a case-insensitive match.
pub async fn find_team_id_by_name(
    pool: &PgPool,
    nombre: &str,
    excluding: Option<i32>,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT ID_EQUIPO FROM DIM_EQUIPO
        WHERE UPPER(NOMBRE) = UPPER($1) AND ($2::INTEGER IS NULL OR ID_EQUIPO <> $2)
        "#,
    )
    .bind(nombre)
    .bind(excluding)
    .fetch_optional(pool)
    .await
}

pub async fn insert_team(
    pool: &PgPool,
    team_id_fbr: &str,
    input: &TeamInput,
) -> Result<Team, sqlx::Error> {
    sqlx::query_as::<_, Team>(&format!(
        r#"
        INSERT INTO DIM_EQUIPO (TEAM_ID_FBR, NOMBRE, APODO, CIUDAD, FECHA_FUNDACION)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        TEAM_COLUMNS
    ))
    .bind(team_id_fbr)
    .bind(&input.nombre)
    .bind(&input.apodo)
    .bind(&input.ciudad)
    .bind(input.fecha_fundacion)
    .fetch_one(pool)
    .await
}

pub async fn update_team(
    pool: &PgPool,
    id_equipo: i32,
    input: &TeamInput,
) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(&format!(
        r#"
        UPDATE DIM_EQUIPO
        SET NOMBRE = $2, APODO = $3, CIUDAD = $4, FECHA_FUNDACION = $5
        WHERE ID_EQUIPO = $1
        RETURNING {}
        "#,
        TEAM_COLUMNS
    ))
    .bind(id_equipo)
    .bind(&input.nombre)
    .bind(&input.apodo)
    .bind(&input.ciudad)
    .bind(input.fecha_fundacion)
    .fetch_optional(pool)
    .await
}

/// Matches where the team plays on either side.
pub async fn count_team_matches(pool: &PgPool, id_equipo: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM HECHOS_RESULTADOS
        WHERE ID_EQUIPO_LOCAL = $1 OR ID_EQUIPO_VISITA = $1
        "#,
    )
    .bind(id_equipo)
    .fetch_one(pool)
    .await
}

pub async fn delete_team(pool: &PgPool, id_equipo: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM DIM_EQUIPO WHERE ID_EQUIPO = $1")
        .bind(id_equipo)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_team_options(pool: &PgPool) -> Result<Vec<TeamOption>, sqlx::Error> {
    sqlx::query_as::<_, TeamOption>(
        "SELECT ID_EQUIPO, NOMBRE, APODO, CIUDAD FROM DIM_EQUIPO ORDER BY NOMBRE",
    )
    .fetch_all(pool)
    .await
}

pub async fn team_exists(pool: &PgPool, id_equipo: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM DIM_EQUIPO WHERE ID_EQUIPO = $1)")
        .bind(id_equipo)
        .fetch_one(pool)
        .await
}
