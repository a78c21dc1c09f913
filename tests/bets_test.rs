use serde_json::{json, Value};

mod common;
use common::league_helpers::{
    match_id_fbr, match_update_body, place_bet, seed_fixture, seed_match, seed_odds,
};
use common::utils::{create_admin_and_login, create_user_and_login, spawn_app};

#[tokio::test]
async fn bet_is_placed_at_fixed_stake_and_current_odds() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = place_bet(&app, &user.token, fixture.id_partido, "visita", Some(fixture.id_visita)).await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Apuesta creada exitosamente");
    let apuesta = &body["apuesta"];
    assert_eq!(apuesta["id_usuario"], user.user_id);
    assert_eq!(apuesta["tipo_apuesta"], "visita");
    assert_eq!(apuesta["monto_apuesta"], "10000.00");
    assert_eq!(apuesta["valor_cuota"], "3.50");
    assert_eq!(apuesta["retorno_potencial"], "35000.00");
    assert_eq!(apuesta["estado"], "pendiente");
    assert_eq!(apuesta["id_torneo"], fixture.id_torneo);
}

#[tokio::test]
async fn second_bet_on_the_same_match_is_rejected() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    place_bet(&app, &user.token, fixture.id_partido, "empate", None).await;
    let response = place_bet(&app, &user.token, fixture.id_partido, "local", Some(fixture.id_local)).await;

    assert_eq!(409, response.status().as_u16());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM apuestas_usuarios WHERE id_usuario = $1")
        .bind(user.user_id)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn predicted_team_must_match_the_bet_side() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = place_bet(&app, &user.token, fixture.id_partido, "local", Some(fixture.id_visita)).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn bet_with_unknown_outcome_is_rejected() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = place_bet(&app, &user.token, fixture.id_partido, "home", Some(fixture.id_local)).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn only_scheduled_matches_take_bets() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let fbr = match_id_fbr(&app.db_pool, fixture.id_partido).await;
    app.put(
        &format!("/partidos/{}", fixture.id_partido),
        &admin.token,
        &match_update_body(&fixture, &fbr, Some((0, 0)), "EN_CURSO"),
    )
    .send()
    .await
    .unwrap();

    let response = place_bet(&app, &user.token, fixture.id_partido, "empate", None).await;
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn bet_without_odds_is_not_found() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    sqlx::query("UPDATE cuotas_partidos SET activa = FALSE WHERE id_partido = $1 AND tipo_resultado = 'empate'")
        .bind(fixture.id_partido)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = place_bet(&app, &user.token, fixture.id_partido, "empate", None).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn bet_on_unknown_match_is_not_found() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;

    let response = place_bet(&app, &user.token, 999_999, "empate", None).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn user_without_betting_rights_is_forbidden() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    sqlx::query("UPDATE usuarios SET puede_apostar = FALSE WHERE id_usuario = $1")
        .bind(user.user_id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = place_bet(&app, &user.token, fixture.id_partido, "empate", None).await;

    assert_eq!(403, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No tienes permisos para realizar apuestas");
}

#[tokio::test]
async fn batch_reports_each_item() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let second = seed_match(
        &app.db_pool,
        fixture.id_torneo,
        fixture.id_visita,
        fixture.id_local,
        fixture.id_estadio,
        2,
    )
    .await;
    seed_odds(&app.db_pool, second, "1.80", "3.20", "4.00").await;
    place_bet(&app, &user.token, second, "empate", None).await;

    let response = app
        .post(
            "/apuestas/batch",
            &user.token,
            &json!({
                "apuestas": [
                    {
                        "idPartido": fixture.id_partido,
                        "tipo": "local",
                        "idEquipoPredicho": fixture.id_local,
                        "partidoInfo": { "equipoLocal": "LOCAL", "equipoVisita": "VISITA" }
                    },
                    { "idPartido": second, "tipo": "local", "idEquipoPredicho": fixture.id_visita },
                    { "idPartido": fixture.id_partido }
                ]
            }),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Proceso completado: 1 exitosas, 2 fallidas");
    assert_eq!(body["exitosas"][0]["equipoLocal"], "LOCAL");
    assert_eq!(body["exitosas"][0]["tipoApuesta"], "local");
    assert_eq!(body["fallidas"][0]["error"], "Ya apostaste en este partido");
    assert_eq!(body["fallidas"][0]["equipoLocal"], "Desconocido");
    assert_eq!(body["fallidas"][1]["error"], "Datos incompletos");
    assert_eq!(body["fallidas"][1]["tipoApuesta"], "N/A");
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;

    let response = app
        .post("/apuestas/batch", &user.token, &json!({ "apuestas": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn my_bets_statistics_and_rounds_reflect_settlement() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let second = seed_match(
        &app.db_pool,
        fixture.id_torneo,
        fixture.id_visita,
        fixture.id_local,
        fixture.id_estadio,
        2,
    )
    .await;
    seed_odds(&app.db_pool, second, "1.80", "3.20", "4.00").await;

    place_bet(&app, &user.token, fixture.id_partido, "local", Some(fixture.id_local)).await;
    place_bet(&app, &user.token, second, "empate", None).await;

    let fbr = match_id_fbr(&app.db_pool, fixture.id_partido).await;
    app.put(
        &format!("/partidos/{}", fixture.id_partido),
        &admin.token,
        &match_update_body(&fixture, &fbr, Some((1, 0)), "FINALIZADO"),
    )
    .send()
    .await
    .unwrap();

    let all: Value = app.get("/apuestas/mis-apuestas", &user.token).send().await.unwrap().json().await.unwrap();
    assert_eq!(all["apuestas"].as_array().unwrap().len(), 2);
    assert_eq!(all["apuestas"][0]["NUMERO_JORNADA"], 1);

    let won: Value = app
        .get("/apuestas/mis-apuestas?estado=ganada", &user.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(won["apuestas"].as_array().unwrap().len(), 1);
    assert_eq!(won["apuestas"][0]["id_partido"], fixture.id_partido);

    let round_two: Value = app
        .get("/apuestas/mis-apuestas?fecha=2", &user.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(round_two["apuestas"][0]["id_partido"], second);

    let stats: Value = app.get("/apuestas/estadisticas", &user.token).send().await.unwrap().json().await.unwrap();
    let stats = &stats["estadisticas"];
    assert_eq!(stats["total_apuestas"], 2);
    assert_eq!(stats["apuestas_ganadas"], 1);
    assert_eq!(stats["apuestas_pendientes"], 1);
    assert_eq!(stats["total_puntos"], "21000.00");
    assert_eq!(stats["porcentaje_aciertos"], "50.00");

    let rounds: Value = app.get("/apuestas/torneos-fechas", &user.token).send().await.unwrap().json().await.unwrap();
    assert_eq!(rounds["torneos"][0]["ID_TORNEO"], fixture.id_torneo);
    assert_eq!(
        rounds["fechasPorTorneo"][fixture.id_torneo.to_string()],
        json!([1, 2])
    );
}

#[tokio::test]
async fn admin_lists_bettors_of_a_tournament() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    place_bet(&app, &user.token, fixture.id_partido, "empate", None).await;

    let response = app
        .get(&format!("/apuestas/admin/usuarios-torneo/{}", fixture.id_torneo), &admin.token)
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let usuarios = body["usuarios"].as_array().unwrap();
    let bettor = usuarios
        .iter()
        .find(|u| u["id_usuario"] == user.user_id)
        .expect("bettor missing");
    assert_eq!(bettor["apuestas"].as_array().unwrap().len(), 1);
    assert_eq!(bettor["estadisticas"]["total_apuestas"], 1);
    assert!(usuarios.iter().all(|u| u["id_usuario"] != admin.user_id));
}

#[tokio::test]
async fn regular_user_cannot_use_admin_bet_routes() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;

    let response = app
        .get("/apuestas/admin/usuarios-torneo/1", &user.token)
        .send()
        .await
        .unwrap();

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn cleanup_removes_bets_and_ledger_rows_of_one_round() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let user = create_user_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;
    let second = seed_match(
        &app.db_pool,
        fixture.id_torneo,
        fixture.id_visita,
        fixture.id_local,
        fixture.id_estadio,
        2,
    )
    .await;
    seed_odds(&app.db_pool, second, "1.80", "3.20", "4.00").await;
    place_bet(&app, &user.token, fixture.id_partido, "local", Some(fixture.id_local)).await;
    place_bet(&app, &user.token, second, "empate", None).await;

    let fbr = match_id_fbr(&app.db_pool, fixture.id_partido).await;
    app.put(
        &format!("/partidos/{}", fixture.id_partido),
        &admin.token,
        &match_update_body(&fixture, &fbr, Some((2, 0)), "FINALIZADO"),
    )
    .send()
    .await
    .unwrap();

    let response = app
        .delete(
            &format!("/apuestas/admin/limpiar/{}/{}?fecha=1", user.user_id, fixture.id_torneo),
            &admin.token,
        )
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["resumen"]["usuario"], user.username);
    assert_eq!(body["resumen"]["fecha"], 1);
    assert_eq!(body["resumen"]["apuestas_eliminadas"], 1);
    assert_eq!(body["resumen"]["puntos_eliminados"], 1);

    let remaining: Vec<i32> = sqlx::query_scalar("SELECT id_partido FROM apuestas_usuarios WHERE id_usuario = $1")
        .bind(user.user_id)
        .fetch_all(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(remaining, vec![second]);
    let ledger: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM historial_puntos WHERE id_usuario = $1")
        .bind(user.user_id)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(ledger, 0);
}

#[tokio::test]
async fn cleanup_of_unknown_user_is_not_found() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let fixture = seed_fixture(&app.db_pool).await;

    let response = app
        .delete(&format!("/apuestas/admin/limpiar/999999/{}", fixture.id_torneo), &admin.token)
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Usuario no encontrado");
}
