use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};

use crate::models::common::CodeName;
use crate::models::player::{
    CountryOption, Player, PlayerCode, PlayerDetail, PlayerInput, PositionOption,
};

const PLAYER_COLUMNS: &str =
    "ID_JUGADOR, PLAYER_ID_FBR, NOMBRE_COMPLETO, APODO, FECHA_NACIMIENTO, PIE_DOMINANTE";

pub async fn list_players(pool: &PgPool) -> Result<Vec<PlayerDetail>, sqlx::Error> {
    let players = sqlx::query_as::<_, Player>(&format!(
        "SELECT {} FROM DIM_JUGADOR ORDER BY NOMBRE_COMPLETO",
        PLAYER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    attach_relations(pool, players).await
}

pub async fn find_player(pool: &PgPool, id_jugador: i32) -> Result<Option<PlayerDetail>, sqlx::Error> {
    let player = sqlx::query_as::<_, Player>(&format!(
        "SELECT {} FROM DIM_JUGADOR WHERE ID_JUGADOR = $1",
        PLAYER_COLUMNS
    ))
    .bind(id_jugador)
    .fetch_optional(pool)
    .await?;

    match player {
        Some(player) => Ok(attach_relations(pool, vec![player]).await?.pop()),
        None => Ok(None),
    }
}

/// Loads nationalities and positions for all players in two queries.
async fn attach_relations(
    pool: &PgPool,
    players: Vec<Player>,
) -> Result<Vec<PlayerDetail>, sqlx::Error> {
    let ids: Vec<i32> = players.iter().map(|p| p.id_jugador).collect();

    let countries = sqlx::query_as::<_, PlayerCode>(
        r#"
        SELECT jp.ID_JUGADOR, p.CODIGO_FIFA AS codigo, p.NOMBRE AS nombre
        FROM DIM_JUGADOR_PAIS jp
        INNER JOIN DIM_PAIS p ON jp.ID_PAIS = p.ID_PAIS
        WHERE jp.ID_JUGADOR = ANY($1)
        ORDER BY jp.ID_JUGADOR, p.NOMBRE
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let positions = sqlx::query_as::<_, PlayerCode>(
        r#"
        SELECT jp.ID_JUGADOR, p.CODIGO_POSICION AS codigo, p.NOMBRE AS nombre
        FROM DIM_JUGADOR_POSICION jp
        INNER JOIN DIM_POSICION p ON jp.ID_POSICION = p.ID_POSICION
        WHERE jp.ID_JUGADOR = ANY($1)
        ORDER BY jp.ID_JUGADOR, jp.ORDEN_PREFERENCIA
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut nacionalidades = group_codes(countries);
    let mut posiciones = group_codes(positions);

    Ok(players
        .into_iter()
        .map(|player| PlayerDetail {
            nacionalidades: nacionalidades.remove(&player.id_jugador).unwrap_or_default(),
            posiciones: posiciones.remove(&player.id_jugador).unwrap_or_default(),
            player,
        })
        .collect())
}

fn group_codes(rows: Vec<PlayerCode>) -> HashMap<i32, Vec<CodeName>> {
    let mut grouped: HashMap<i32, Vec<CodeName>> = HashMap::new();
    for row in rows {
        grouped.entry(row.id_jugador).or_default().push(CodeName {
            codigo: row.codigo,
            nombre: row.nombre,
        });
    }
    grouped
}

pub async fn find_player_id_by_fbr(
    pool: &PgPool,
    player_id_fbr: &str,
    excluding: Option<i32>,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT ID_JUGADOR FROM DIM_JUGADOR
        WHERE PLAYER_ID_FBR = $1 AND ($2::INTEGER IS NULL OR ID_JUGADOR <> $2)
        "#,
    )
    .bind(player_id_fbr)
    .bind(excluding)
    .fetch_optional(pool)
    .await
}

/// FIFA code to `ID_PAIS` for the codes that exist.
pub async fn country_ids(
    conn: &mut PgConnection,
    codes: &[String],
) -> Result<HashMap<String, i32>, sqlx::Error> {
    let rows: Vec<(String, i32)> = sqlx::query_as(
        "SELECT CODIGO_FIFA, ID_PAIS FROM DIM_PAIS WHERE CODIGO_FIFA = ANY($1)",
    )
    .bind(codes)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().collect())
}

/// Position code to `ID_POSICION` for the codes that exist.
pub async fn position_ids(
    conn: &mut PgConnection,
    codes: &[String],
) -> Result<HashMap<String, i32>, sqlx::Error> {
    let rows: Vec<(String, i32)> = sqlx::query_as(
        "SELECT CODIGO_POSICION, ID_POSICION FROM DIM_POSICION WHERE CODIGO_POSICION = ANY($1)",
    )
    .bind(codes)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().collect())
}

pub async fn insert_player(conn: &mut PgConnection, input: &PlayerInput) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO DIM_JUGADOR (PLAYER_ID_FBR, NOMBRE_COMPLETO, APODO, FECHA_NACIMIENTO, PIE_DOMINANTE)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING ID_JUGADOR
        "#,
    )
    .bind(&input.player_id_fbr)
    .bind(&input.nombre_completo)
    .bind(&input.apodo)
    .bind(input.fecha_nacimiento)
    .bind(&input.pie_dominante)
    .fetch_one(conn)
    .await
}

pub async fn update_player(
    conn: &mut PgConnection,
    id_jugador: i32,
    input: &PlayerInput,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE DIM_JUGADOR
        SET PLAYER_ID_FBR = $2, NOMBRE_COMPLETO = $3, APODO = $4, FECHA_NACIMIENTO = $5, PIE_DOMINANTE = $6
        WHERE ID_JUGADOR = $1
        "#,
    )
    .bind(id_jugador)
    .bind(&input.player_id_fbr)
    .bind(&input.nombre_completo)
    .bind(&input.apodo)
    .bind(input.fecha_nacimiento)
    .bind(&input.pie_dominante)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Rewrites both relation tables. The first position is the main one and the order is kept.
pub async fn replace_relations(
    conn: &mut PgConnection,
    id_jugador: i32,
    country_ids: &[i32],
    position_ids: &[i32],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM DIM_JUGADOR_PAIS WHERE ID_JUGADOR = $1")
        .bind(id_jugador)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM DIM_JUGADOR_POSICION WHERE ID_JUGADOR = $1")
        .bind(id_jugador)
        .execute(&mut *conn)
        .await?;

    for id_pais in country_ids {
        sqlx::query(
            "INSERT INTO DIM_JUGADOR_PAIS (ID_JUGADOR, ID_PAIS, TIPO_RELACION) VALUES ($1, $2, 'NACIONALIDAD')",
        )
        .bind(id_jugador)
        .bind(id_pais)
        .execute(&mut *conn)
        .await?;
    }

    for (index, id_posicion) in position_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO DIM_JUGADOR_POSICION (ID_JUGADOR, ID_POSICION, ES_POSICION_PRINCIPAL, ORDEN_PREFERENCIA)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id_jugador)
        .bind(id_posicion)
        .bind(index == 0)
        .bind(index as i32 + 1)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn count_player_statistics(pool: &PgPool, id_jugador: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM HECHOS_ESTADISTICAS WHERE ID_JUGADOR = $1")
        .bind(id_jugador)
        .fetch_one(pool)
        .await
}

/// Relations go with the player through `ON DELETE CASCADE`.
pub async fn delete_player(pool: &PgPool, id_jugador: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM DIM_JUGADOR WHERE ID_JUGADOR = $1")
        .bind(id_jugador)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_countries(pool: &PgPool) -> Result<Vec<CountryOption>, sqlx::Error> {
    sqlx::query_as::<_, CountryOption>(
        r#"
        SELECT ID_PAIS AS pais_id, CODIGO_FIFA AS codigo_pais, NOMBRE AS nombre_pais
        FROM DIM_PAIS
        ORDER BY NOMBRE
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn list_positions(pool: &PgPool) -> Result<Vec<PositionOption>, sqlx::Error> {
    sqlx::query_as::<_, PositionOption>(
        r#"
        SELECT ID_POSICION AS posicion_id, CODIGO_POSICION AS codigo_posicion, NOMBRE AS nombre_posicion
        FROM DIM_POSICION
        ORDER BY ID_POSICION
        "#,
    )
    .fetch_all(pool)
    .await
}
