use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::utils::TestApp;

fn suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

pub async fn seed_team(pool: &PgPool, nombre: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO DIM_EQUIPO (TEAM_ID_FBR, NOMBRE, CIUDAD) VALUES ($1, $2, 'SANTIAGO') RETURNING ID_EQUIPO",
    )
    .bind(format!("seed_{}", suffix()))
    .bind(nombre)
    .fetch_one(pool)
    .await
    .expect("Failed to seed team")
}

pub async fn seed_stadium(pool: &PgPool, nombre: &str) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO DIM_ESTADIO (NOMBRE, CAPACIDAD, CIUDAD, FECHA_INAUGURACION, SUPERFICIE)
        VALUES ($1, 45000, 'SANTIAGO', DATE '1938-12-03', 'CESPED')
        RETURNING ID_ESTADIO
        "#,
    )
    .bind(nombre)
    .fetch_one(pool)
    .await
    .expect("Failed to seed stadium")
}

pub async fn seed_tournament(pool: &PgPool, nombre: &str) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO DIM_TORNEO (NOMBRE, RUEDA, TEMPORADA, FORMATO_TORNEO)
        VALUES ($1, 'PRIMERA', 2025, 'RUEDAS')
        RETURNING ID_TORNEO
        "#,
    )
    .bind(nombre)
    .fetch_one(pool)
    .await
    .expect("Failed to seed tournament")
}

pub async fn seed_match(
    pool: &PgPool,
    id_torneo: i32,
    id_local: i32,
    id_visita: i32,
    id_estadio: i32,
    jornada: i32,
) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO HECHOS_RESULTADOS (
            MATCH_ID_FBR, ID_TORNEO, FECHA_PARTIDO, FECHA_TORNEO, NUMERO_JORNADA,
            ID_EQUIPO_LOCAL, ID_EQUIPO_VISITA, ID_ESTADIO
        )
        VALUES ($1, $2, TIMESTAMP '2025-03-15 18:00:00', 20250315, $3, $4, $5, $6)
        RETURNING ID_PARTIDO
        "#,
    )
    .bind(format!("M{}", suffix()))
    .bind(id_torneo)
    .bind(jornada)
    .bind(id_local)
    .bind(id_visita)
    .bind(id_estadio)
    .fetch_one(pool)
    .await
    .expect("Failed to seed match")
}

/// Odds for local, empate and visita, in that order.
pub async fn seed_odds(pool: &PgPool, id_partido: i32, local: &str, empate: &str, visita: &str) {
    for (tipo, cuota) in [("local", local), ("empate", empate), ("visita", visita)] {
        sqlx::query(
            "INSERT INTO cuotas_partidos (id_partido, tipo_resultado, cuota_decimal) VALUES ($1, $2, $3)",
        )
        .bind(id_partido)
        .bind(tipo)
        .bind(cuota.parse::<Decimal>().expect("Invalid odds literal"))
        .execute(pool)
        .await
        .expect("Failed to seed odds");
    }
}

pub async fn set_config(pool: &PgPool, clave: &str, valor: &str) {
    sqlx::query("UPDATE config_apuestas SET valor = $2 WHERE clave = $1")
        .bind(clave)
        .bind(valor)
        .execute(pool)
        .await
        .expect("Failed to update betting config");
}

/// A scheduled match between two fresh teams, priced 2.10 / 3.10 / 3.50.
pub struct Fixture {
    pub id_torneo: i32,
    pub id_local: i32,
    pub id_visita: i32,
    pub id_estadio: i32,
    pub id_partido: i32,
}

pub async fn seed_fixture(pool: &PgPool) -> Fixture {
    let tag = suffix();
    let id_torneo = seed_tournament(pool, &format!("CAMPEONATO {}", tag)).await;
    let id_local = seed_team(pool, &format!("LOCAL {}", tag)).await;
    let id_visita = seed_team(pool, &format!("VISITA {}", tag)).await;
    let id_estadio = seed_stadium(pool, &format!("ESTADIO {}", tag)).await;
    let id_partido = seed_match(pool, id_torneo, id_local, id_visita, id_estadio, 1).await;
    seed_odds(pool, id_partido, "2.10", "3.10", "3.50").await;
    Fixture {
        id_torneo,
        id_local,
        id_visita,
        id_estadio,
        id_partido,
    }
}

/// Body of a match update that keeps the fixture's teams, tournament and stadium.
pub fn match_update_body(
    fixture: &Fixture,
    match_id_fbr: &str,
    goles: Option<(i32, i32)>,
    estado: &str,
) -> Value {
    json!({
        "matchIdFbr": match_id_fbr,
        "idTorneo": fixture.id_torneo,
        "fechaPartido": "2025-03-15T18:00:00",
        "idEquipoLocal": fixture.id_local,
        "idEquipoVisita": fixture.id_visita,
        "idEstadio": fixture.id_estadio,
        "golesLocal": goles.map(|g| g.0),
        "golesVisita": goles.map(|g| g.1),
        "estadoPartido": estado,
        "numeroJornada": 1
    })
}

pub async fn match_id_fbr(pool: &PgPool, id_partido: i32) -> String {
    sqlx::query_scalar("SELECT MATCH_ID_FBR FROM HECHOS_RESULTADOS WHERE ID_PARTIDO = $1")
        .bind(id_partido)
        .fetch_one(pool)
        .await
        .expect("Failed to read match id")
}

pub async fn place_bet(
    app: &TestApp,
    token: &str,
    id_partido: i32,
    tipo: &str,
    id_equipo: Option<i32>,
) -> reqwest::Response {
    app.post(
        "/apuestas",
        token,
        &json!({
            "id_partido": id_partido,
            "tipo_apuesta": tipo,
            "id_equipo_predicho": id_equipo
        }),
    )
    .send()
    .await
    .expect("Failed to execute bet request.")
}
