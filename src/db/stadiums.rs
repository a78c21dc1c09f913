use sqlx::PgPool;

use crate::models::stadium::{Stadium, StadiumInput, StadiumOption};

const STADIUM_COLUMNS: &str =
    "ID_ESTADIO, NOMBRE, CAPACIDAD, CIUDAD, FECHA_INAUGURACION, SUPERFICIE";

pub async fn list_stadiums(pool: &PgPool) -> Result<Vec<Stadium>, sqlx::Error> {
    sqlx::query_as::<_, Stadium>(&format!(
        "SELECT {} FROM DIM_ESTADIO ORDER BY NOMBRE",
        STADIUM_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_stadium(pool: &PgPool, id_estadio: i32) -> Result<Option<Stadium>, sqlx::Error> {
    sqlx::query_as::<_, Stadium>(&format!(
        "SELECT {} FROM DIM_ESTADIO WHERE ID_ESTADIO = $1",
        STADIUM_COLUMNS
    ))
    .bind(id_estadio)
    .fetch_optional(pool)
    .await
}

pub async fn find_stadium_id_by_name(
    pool: &PgPool,
    nombre: &str,
    excluding: Option<i32>,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT ID_ESTADIO FROM DIM_ESTADIO
        WHERE UPPER(NOMBRE) = UPPER($1) AND ($2::INTEGER IS NULL OR ID_ESTADIO <> $2)
        "#,
    )
    .bind(nombre)
    .bind(excluding)
    .fetch_optional(pool)
    .await
}

pub async fn insert_stadium(pool: &PgPool, input: &StadiumInput) -> Result<Stadium, sqlx::Error> {
    sqlx::query_as::<_, Stadium>(&format!(
        r#"
        INSERT INTO DIM_ESTADIO (NOMBRE, CAPACIDAD, CIUDAD, FECHA_INAUGURACION, SUPERFICIE)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        STADIUM_COLUMNS
    ))
    .bind(&input.nombre)
    .bind(input.capacidad)
    .bind(&input.ciudad)
    .bind(input.fecha_inauguracion)
    .bind(&input.superficie)
    .fetch_one(pool)
    .await
}

pub async fn update_stadium(
    pool: &PgPool,
    id_estadio: i32,
    input: &StadiumInput,
) -> Result<Option<Stadium>, sqlx::Error> {
    sqlx::query_as::<_, Stadium>(&format!(
        r#"
        UPDATE DIM_ESTADIO
        SET NOMBRE = $2, CAPACIDAD = $3, CIUDAD = $4, FECHA_INAUGURACION = $5, SUPERFICIE = $6
        WHERE ID_ESTADIO = $1
        RETURNING {}
        "#,
        STADIUM_COLUMNS
    ))
    .bind(id_estadio)
    .bind(&input.nombre)
    .bind(input.capacidad)
    .bind(&input.ciudad)
    .bind(input.fecha_inauguracion)
    .bind(&input.superficie)
    .fetch_optional(pool)
    .await
}

pub async fn count_stadium_matches(pool: &PgPool, id_estadio: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM HECHOS_RESULTADOS WHERE ID_ESTADIO = $1")
        .bind(id_estadio)
        .fetch_one(pool)
        .await
}

pub async fn delete_stadium(pool: &PgPool, id_estadio: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM DIM_ESTADIO WHERE ID_ESTADIO = $1")
        .bind(id_estadio)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_stadium_options(pool: &PgPool) -> Result<Vec<StadiumOption>, sqlx::Error> {
    sqlx::query_as::<_, StadiumOption>(
        "SELECT ID_ESTADIO, NOMBRE, CIUDAD, CAPACIDAD FROM DIM_ESTADIO ORDER BY NOMBRE",
    )
    .fetch_all(pool)
    .await
}

pub async fn stadium_exists(pool: &PgPool, id_estadio: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM DIM_ESTADIO WHERE ID_ESTADIO = $1)")
        .bind(id_estadio)
        .fetch_one(pool)
        .await
}
