use serde_json::{json, Value};

mod common;
use common::league_helpers::{
    match_id_fbr, match_update_body, seed_fixture, seed_stadium, seed_team, seed_tournament,
};
use common::utils::{create_admin_and_login, create_user_and_login, spawn_app};

#[tokio::test]
async fn team_name_is_upper_cased_and_unique() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post(
            "/equipos",
            &admin.token,
            &json!({ "nombre": "Colo Colo", "apodo": "el cacique", "ciudad": "Santiago" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["equipo"]["NOMBRE"], "COLO COLO");
    assert_eq!(body["equipo"]["CIUDAD"], "SANTIAGO");
    assert!(body["equipo"]["TEAM_ID_FBR"].as_str().unwrap().starts_with("custom_"));

    let duplicate = app
        .post("/equipos", &admin.token, &json!({ "nombre": "colo colo", "ciudad": "Macul" }))
        .send()
        .await
        .unwrap();
    assert_eq!(409, duplicate.status().as_u16());
    let body: Value = duplicate.json().await.unwrap();
    assert_eq!(body["error"], "Ya existe un equipo con ese nombre");
}

#[tokio::test]
async fn team_requires_name_and_city() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post("/equipos", &admin.token, &json!({ "nombre": "Sin Ciudad" }))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn team_foundation_date_cannot_be_in_the_future() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post(
            "/equipos",
            &admin.token,
            &json!({ "nombre": "Futuro FC", "ciudad": "Talca", "fechaFundacion": "2999-01-01" }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn team_used_in_a_match_cannot_be_deleted() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = app
        .delete(&format!("/equipos/{}", fixture.id_local), &admin.token)
        .send()
        .await
        .unwrap();

    assert_eq!(409, response.status().as_u16());
    let still_there = app
        .get(&format!("/equipos/{}", fixture.id_local), &admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, still_there.status().as_u16());
}

#[tokio::test]
async fn unused_team_is_deleted() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let id = seed_team(&app.db_pool, "HUACHIPATO").await;

    let response = app.delete(&format!("/equipos/{}", id), &admin.token).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());

    let gone = app.get(&format!("/equipos/{}", id), &admin.token).send().await.unwrap();
    assert_eq!(404, gone.status().as_u16());
}

#[tokio::test]
async fn stadium_capacity_must_be_positive() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post(
            "/estadios",
            &admin.token,
            &json!({
                "nombre": "Estadio Chico",
                "capacidad": 0,
                "ciudad": "Valdivia",
                "fechaInauguracion": "1990-05-01",
                "superficie": "Cesped"
            }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn stadium_duplicate_name_conflicts() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    seed_stadium(&app.db_pool, "ESTADIO NACIONAL").await;

    let response = app
        .post(
            "/estadios",
            &admin.token,
            &json!({
                "nombre": "Estadio Nacional",
                "capacidad": 48000,
                "ciudad": "Santiago",
                "fechaInauguracion": "1938-12-03",
                "superficie": "Cesped"
            }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn player_is_created_with_nationalities_and_positions() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post(
            "/players",
            &admin.token,
            &json!({
                "player_id_fbr": "abc123",
                "nombre_completo": "Alexis Sanchez",
                "nacionalidades": ["CHI"],
                "posiciones": ["DEL", "MED"]
            }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["nacionalidades"][0]["codigo"], "CHI");
    assert_eq!(body["posiciones"].as_array().unwrap().len(), 2);

    let duplicate = app
        .post(
            "/players",
            &admin.token,
            &json!({ "player_id_fbr": "abc123", "nombre_completo": "Otro" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(409, duplicate.status().as_u16());
}

#[tokio::test]
async fn player_with_unknown_country_is_rejected_without_a_trace() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post(
            "/players",
            &admin.token,
            &json!({
                "player_id_fbr": "zzz999",
                "nombre_completo": "Nadie",
                "nacionalidades": ["XXX"]
            }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM DIM_JUGADOR WHERE PLAYER_ID_FBR = 'zzz999'")
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn tournament_in_rounds_needs_a_round() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post(
            "/torneos",
            &admin.token,
            &json!({ "nombre": "Liga", "temporada": 2025, "formatoTorneo": "RUEDAS" }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn tournament_with_phases_is_created() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post(
            "/torneos",
            &admin.token,
            &json!({
                "nombre": "Copa Chile",
                "temporada": 2025,
                "formatoTorneo": "FASES",
                "fases": [{ "nombre": "Octavos" }, { "nombre": "Final" }]
            }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["torneo"]["NOMBRE"], "COPA CHILE");
    assert_eq!(body["torneo"]["FASES"].as_array().unwrap().len(), 2);
}

async fn tournament_count(pool: &sqlx::PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM DIM_TORNEO")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn tournament_duplicate_natural_key_conflicts() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let first = app
        .post(
            "/torneos",
            &admin.token,
            &json!({ "nombre": "Liga de Primera", "temporada": 2025, "formatoTorneo": "RUEDAS", "rueda": "PRIMERA" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(201, first.status().as_u16());
    let before = tournament_count(&app.db_pool).await;

    let again = app
        .post(
            "/torneos",
            &admin.token,
            &json!({ "nombre": "liga de primera", "temporada": 2025, "formatoTorneo": "RUEDAS", "rueda": "PRIMERA" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(409, again.status().as_u16());
    assert_eq!(tournament_count(&app.db_pool).await, before);

    // Same name in another season is a different tournament
    let next_season = app
        .post(
            "/torneos",
            &admin.token,
            &json!({ "nombre": "Liga de Primera", "temporada": 2026, "formatoTorneo": "RUEDAS", "rueda": "PRIMERA" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(201, next_season.status().as_u16());
}

#[tokio::test]
async fn tournaments_are_readable_but_not_writable_by_users() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    seed_tournament(&app.db_pool, "PRIMERA DIVISION").await;

    let read = app.get("/torneos", &user.token).send().await.unwrap();
    assert_eq!(200, read.status().as_u16());

    let write = app
        .post(
            "/torneos",
            &user.token,
            &json!({ "nombre": "Pirata", "temporada": 2025, "formatoTorneo": "RUEDAS", "rueda": "PRIMERA" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(403, write.status().as_u16());
}

#[tokio::test]
async fn match_requires_distinct_teams() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = app
        .post(
            "/partidos",
            &admin.token,
            &json!({
                "matchIdFbr": "mismo-equipo",
                "idTorneo": fixture.id_torneo,
                "fechaPartido": "2025-04-01T20:00:00",
                "idEquipoLocal": fixture.id_local,
                "idEquipoVisita": fixture.id_local,
                "idEstadio": fixture.id_estadio
            }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn match_accepts_ids_as_strings_and_defaults_to_scheduled() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = app
        .post(
            "/partidos",
            &admin.token,
            &json!({
                "matchIdFbr": "vuelta-1",
                "idTorneo": fixture.id_torneo.to_string(),
                "fechaPartido": "2025-04-01T20:00:00",
                "idEquipoLocal": fixture.id_visita.to_string(),
                "idEquipoVisita": fixture.id_local.to_string(),
                "idEstadio": fixture.id_estadio.to_string()
            }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["partido"]["ESTADO_PARTIDO"], "PROGRAMADO");
    assert_eq!(body["partido"]["FECHA_TORNEO"], 20250401);
}

#[tokio::test]
async fn match_with_unknown_stadium_is_rejected() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = app
        .post(
            "/partidos",
            &admin.token,
            &json!({
                "matchIdFbr": "sin-estadio",
                "idTorneo": fixture.id_torneo,
                "fechaPartido": "2025-04-01",
                "idEquipoLocal": fixture.id_local,
                "idEquipoVisita": fixture.id_visita,
                "idEstadio": 999999
            }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn matches_are_filtered_by_tournament() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let first = seed_fixture(&app.db_pool).await;
    seed_fixture(&app.db_pool).await;

    let response = app
        .get(&format!("/partidos?torneoId={}", first.id_torneo), &user.token)
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let partidos = body.as_array().unwrap();
    assert_eq!(partidos.len(), 1);
    assert_eq!(partidos[0]["ID_PARTIDO"], first.id_partido);
}

#[tokio::test]
async fn match_list_rejects_oversized_page() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;

    let response = app.get("/partidos?limit=501", &user.token).send().await.unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn match_update_with_non_numeric_goals_is_rejected() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let fbr = match_id_fbr(&app.db_pool, fixture.id_partido).await;

    let mut body = match_update_body(&fixture, &fbr, Some((1, 0)), "FINALIZADO");
    body["golesLocal"] = json!("dos");
    let response = app
        .put(&format!("/partidos/{}", fixture.id_partido), &admin.token, &body)
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());

    let (estado, goles): (String, Option<i32>) = sqlx::query_as(
        "SELECT ESTADO_PARTIDO, GOLES_LOCAL FROM HECHOS_RESULTADOS WHERE ID_PARTIDO = $1",
    )
    .bind(fixture.id_partido)
    .fetch_one(&app.db_pool)
    .await
    .unwrap();
    assert_eq!(estado, "PROGRAMADO");
    assert_eq!(goles, None);
}
