use serde_json::{json, Value};

mod common;
use common::league_helpers::{place_bet, seed_fixture, seed_match, seed_odds, seed_tournament};
use common::utils::{create_admin_and_login, create_user_and_login, spawn_app};

fn odds_body(local: &str, empate: &str, visita: &str) -> Value {
    json!({
        "cuotas": [
            { "tipo_resultado": "visita", "cuota_decimal": visita },
            { "tipo_resultado": "local", "cuota_decimal": local },
            { "tipo_resultado": "empate", "cuota_decimal": empate }
        ]
    })
}

#[tokio::test]
async fn admin_replaces_match_odds() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = app
        .post(
            &format!("/cuotas/partido/{}", fixture.id_partido),
            &admin.token,
            &odds_body("1.95", "3.40", "4.25"),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["cuotas_creadas"], 3);

    let listed: Value = app
        .get(&format!("/cuotas/partido/{}", fixture.id_partido), &user.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let cuotas = listed["cuotas"].as_array().unwrap();
    let tipos: Vec<&str> = cuotas.iter().map(|c| c["tipo_resultado"].as_str().unwrap()).collect();
    assert_eq!(tipos, vec!["local", "empate", "visita"]);
    assert_eq!(cuotas[0]["cuota_decimal"], "1.95");
    assert_eq!(cuotas[2]["cuota_decimal"], "4.25");
}

#[tokio::test]
async fn new_bets_use_the_replaced_odds() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    app.post(
        &format!("/cuotas/partido/{}", fixture.id_partido),
        &admin.token,
        &odds_body("1.50", "3.00", "5.00"),
    )
    .send()
    .await
    .unwrap();

    let body: Value = place_bet(&app, &user.token, fixture.id_partido, "local", Some(fixture.id_local))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["apuesta"]["valor_cuota"], "1.50");
    assert_eq!(body["apuesta"]["retorno_potencial"], "15000.00");
}

#[tokio::test]
async fn odds_need_exactly_three_prices_above_one() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let path = format!("/cuotas/partido/{}", fixture.id_partido);

    let two = json!({ "cuotas": [
        { "tipo_resultado": "local", "cuota_decimal": "2.00" },
        { "tipo_resultado": "visita", "cuota_decimal": "2.00" }
    ]});
    let too_low = odds_body("1.00", "3.00", "4.00");
    let repeated = json!({ "cuotas": [
        { "tipo_resultado": "local", "cuota_decimal": "2.00" },
        { "tipo_resultado": "local", "cuota_decimal": "2.00" },
        { "tipo_resultado": "visita", "cuota_decimal": "2.00" }
    ]});

    for (body, description) in [(two, "two prices"), (too_low, "price of one"), (repeated, "repeated side")] {
        let response = app.post(&path, &admin.token, &body).send().await.unwrap();
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not reject odds with {}.",
            description
        );
    }

    // The seeded prices survive the rejected writes
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cuotas_partidos WHERE id_partido = $1")
        .bind(fixture.id_partido)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(stored, 3);
}

#[tokio::test]
async fn odds_for_unknown_match_are_not_found() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .post("/cuotas/partido/999999", &admin.token, &odds_body("2.00", "3.00", "4.00"))
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn regular_user_cannot_set_odds() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = app
        .post(
            &format!("/cuotas/partido/{}", fixture.id_partido),
            &user.token,
            &odds_body("2.00", "3.00", "4.00"),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn disabled_betting_lists_no_matches() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    seed_fixture(&app.db_pool).await;

    app.put("/config-apuestas", &admin.token, &json!({ "apuestas_habilitadas": false }))
        .send()
        .await
        .unwrap();

    let body: Value = app.get("/cuotas/partidos", &user.token).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["partidos"], json!([]));
    assert_eq!(body["mensaje"], "Las apuestas están temporalmente deshabilitadas");
}

#[tokio::test]
async fn bettable_matches_follow_the_configured_round() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let round_two = seed_match(
        &app.db_pool,
        fixture.id_torneo,
        fixture.id_visita,
        fixture.id_local,
        fixture.id_estadio,
        2,
    )
    .await;
    seed_odds(&app.db_pool, round_two, "1.80", "3.20", "4.00").await;
    // Without odds it never shows up
    seed_match(
        &app.db_pool,
        fixture.id_torneo,
        fixture.id_local,
        fixture.id_visita,
        fixture.id_estadio,
        2,
    )
    .await;

    let response = app
        .put(
            "/config-apuestas",
            &admin.token,
            &json!({ "torneo_activo_id": fixture.id_torneo, "fecha_habilitada": 2 }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let body: Value = app.get("/cuotas/partidos", &user.token).send().await.unwrap().json().await.unwrap();
    let partidos = body["partidos"].as_array().unwrap();
    assert_eq!(partidos.len(), 1);
    assert_eq!(partidos[0]["ID_PARTIDO"], round_two);
    assert_eq!(partidos[0]["total_cuotas"], 3);
}

#[tokio::test]
async fn matches_already_bet_on_are_left_out() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let other = seed_match(
        &app.db_pool,
        fixture.id_torneo,
        fixture.id_visita,
        fixture.id_local,
        fixture.id_estadio,
        1,
    )
    .await;
    seed_odds(&app.db_pool, other, "1.80", "3.20", "4.00").await;
    app.put(
        "/config-apuestas",
        &admin.token,
        &json!({ "torneo_activo_id": fixture.id_torneo, "fecha_habilitada": 1 }),
    )
    .send()
    .await
    .unwrap();

    place_bet(&app, &user.token, fixture.id_partido, "empate", None).await;

    let body: Value = app
        .get("/cuotas/partidos-sin-apostar", &user.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["partidos"][0]["ID_PARTIDO"], other);
    assert_eq!(body["torneo_activo_id"], fixture.id_torneo);
    assert_eq!(body["fecha_activa"], 1);
    assert!(body["torneo_activo_nombre"]
        .as_str()
        .unwrap()
        .ends_with("2025 - Primera rueda"));
}

#[tokio::test]
async fn betting_config_is_public_and_labels_the_tournament() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let id_torneo = seed_tournament(&app.db_pool, "APERTURA").await;

    app.put(
        "/config-apuestas",
        &admin.token,
        &json!({ "torneo_activo_id": id_torneo, "fecha_habilitada": 3 }),
    )
    .send()
    .await
    .unwrap();

    let response = app.client.get(app.url("/config-apuestas")).send().await.unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["config"]["apuestas_habilitadas"], true);
    assert_eq!(body["config"]["torneo_activo_id"], id_torneo);
    assert_eq!(body["config"]["fecha_habilitada"], 3);
    assert_eq!(body["config"]["torneo_activo_nombre"], "APERTURA 2025 - Primera rueda");
}

#[tokio::test]
async fn config_can_be_cleared() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let id_torneo = seed_tournament(&app.db_pool, "CLAUSURA").await;
    app.put("/config-apuestas", &admin.token, &json!({ "torneo_activo_id": id_torneo }))
        .send()
        .await
        .unwrap();

    let body: Value = app
        .put("/config-apuestas", &admin.token, &json!({ "torneo_activo_id": null }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["config"]["torneo_activo_id"].is_null());
}

#[tokio::test]
async fn config_rejects_unknown_tournament_and_bad_round() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let unknown = app
        .put("/config-apuestas", &admin.token, &json!({ "torneo_activo_id": 999999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(400, unknown.status().as_u16());
    let body: Value = unknown.json().await.unwrap();
    assert_eq!(body["error"], "El torneo especificado no existe");

    let zero = app
        .put("/config-apuestas", &admin.token, &json!({ "fecha_habilitada": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(400, zero.status().as_u16());
}

#[tokio::test]
async fn regular_user_cannot_change_config() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;

    let response = app
        .put("/config-apuestas", &user.token, &json!({ "apuestas_habilitadas": false }))
        .send()
        .await
        .unwrap();

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn admin_sees_rounds_and_round_matches() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let unpriced = seed_match(
        &app.db_pool,
        fixture.id_torneo,
        fixture.id_visita,
        fixture.id_local,
        fixture.id_estadio,
        4,
    )
    .await;

    let body: Value = app
        .get("/config-apuestas/torneos-fechas", &admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let torneo = body["torneos"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["ID_TORNEO"] == fixture.id_torneo)
        .expect("tournament with matches missing")
        .clone();
    assert_eq!(torneo["fechas"], json!([1, 4]));

    let body: Value = app
        .get(&format!("/config-apuestas/partidos/{}/todas", fixture.id_torneo), &admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let partidos = body["partidos"].as_array().unwrap();
    assert_eq!(partidos.len(), 2);
    let priced = partidos.iter().find(|p| p["ID_PARTIDO"] == fixture.id_partido).unwrap();
    assert_eq!(priced["tiene_cuotas"], true);
    assert_eq!(priced["cuotas"].as_array().unwrap().len(), 3);
    let bare = partidos.iter().find(|p| p["ID_PARTIDO"] == unpriced).unwrap();
    assert_eq!(bare["tiene_cuotas"], false);

    let body: Value = app
        .get(&format!("/config-apuestas/partidos/{}/4", fixture.id_torneo), &admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["partidos"].as_array().unwrap().len(), 1);

    let response = app
        .get(&format!("/config-apuestas/partidos/{}/cuarta", fixture.id_torneo), &admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}
