use std::collections::BTreeMap;

use sqlx::{PgConnection, PgPool};

use crate::models::betting::{BettingConfig, ConfigEntry};
use crate::models::tournament::TournamentOption;

pub async fn load_entries(pool: &PgPool) -> Result<BTreeMap<String, String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ConfigEntry>("SELECT clave, valor FROM config_apuestas")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|row| (row.clave, row.valor)).collect())
}

pub async fn load_config(pool: &PgPool) -> Result<BettingConfig, sqlx::Error> {
    Ok(BettingConfig::from_entries(&load_entries(pool).await?))
}

/// Upsert so a database seeded without a key still accepts it.
pub async fn set_value(conn: &mut PgConnection, clave: &str, valor: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO config_apuestas (clave, valor, fecha_actualizacion)
        VALUES ($1, $2, NOW())
        ON CONFLICT (clave) DO UPDATE SET valor = EXCLUDED.valor, fecha_actualizacion = NOW()
        "#,
    )
    .bind(clave)
    .bind(valor)
    .execute(conn)
    .await?;
    Ok(())
}

/// Tournaments that have at least one match.
pub async fn tournaments_with_matches(pool: &PgPool) -> Result<Vec<TournamentOption>, sqlx::Error> {
    sqlx::query_as::<_, TournamentOption>(
        r#"
        SELECT t.ID_TORNEO, t.NOMBRE, t.TEMPORADA, t.RUEDA
        FROM DIM_TORNEO t
        WHERE EXISTS (SELECT 1 FROM HECHOS_RESULTADOS p WHERE p.ID_TORNEO = t.ID_TORNEO)
        ORDER BY t.TEMPORADA DESC, t.NOMBRE
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Every `(tournament, round)` pair that has a match, whatever its state.
pub async fn tournament_rounds(pool: &PgPool) -> Result<Vec<(i32, i32)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT DISTINCT ID_TORNEO, NUMERO_JORNADA
        FROM HECHOS_RESULTADOS
        WHERE NUMERO_JORNADA IS NOT NULL
        ORDER BY ID_TORNEO, NUMERO_JORNADA
        "#,
    )
    .fetch_all(pool)
    .await
}
