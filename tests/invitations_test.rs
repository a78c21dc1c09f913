use serde_json::{json, Value};

mod common;
use common::utils::{create_admin_and_login, spawn_app, unique_username};

async fn create_token(app: &common::utils::TestApp, admin_token: &str) -> Value {
    let response = app
        .post("/tokens-invitacion", admin_token, &json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());
    response.json().await.unwrap()
}

#[tokio::test]
async fn invitation_link_points_at_register_page() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let body = create_token(&app, &admin.token).await;

    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(body["invitationLink"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/register?token={}", token)));
}

#[tokio::test]
async fn fresh_token_validates_publicly() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let token = create_token(&app, &admin.token).await["token"].as_str().unwrap().to_string();

    let response = app
        .client
        .get(app.url(&format!("/tokens-invitacion/validar/{}", token)))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["valido"], true);
    assert!(body["fechaExpiracion"].is_string());
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/tokens-invitacion/validar/deadbeef"))
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["valido"], false);
}

#[tokio::test]
async fn token_is_consumed_by_registration() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let token = create_token(&app, &admin.token).await["token"].as_str().unwrap().to_string();

    let register = |username: String| {
        app.client
            .post(app.url("/auth/register"))
            .json(&json!({ "username": username, "password": "secreto1", "token": token }))
            .send()
    };

    assert_eq!(201, register(unique_username("invitado")).await.unwrap().status().as_u16());

    let second = register(unique_username("colado")).await.unwrap();
    assert_eq!(400, second.status().as_u16());
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "Este token de invitación ya fue utilizado");

    let validation = app
        .client
        .get(app.url(&format!("/tokens-invitacion/validar/{}", token)))
        .send()
        .await
        .unwrap();
    assert_eq!(400, validation.status().as_u16());

    let list: Value = app
        .get("/tokens-invitacion", &admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = list
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["token"] == token.as_str())
        .expect("token listed");
    assert_eq!(entry["estado"], "usado");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;
    let token = create_token(&app, &admin.token).await["token"].as_str().unwrap().to_string();
    sqlx::query(
        "UPDATE tokens_invitacion SET fecha_expiracion = NOW() - INTERVAL '1 day' WHERE token = $1",
    )
    .bind(&token)
    .execute(&app.db_pool)
    .await
    .unwrap();

    let response = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({ "username": unique_username("tarde"), "password": "secreto1", "token": token }))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Este token de invitación ha expirado");
}

#[tokio::test]
async fn deleting_unknown_token_is_not_found() {
    let app = spawn_app().await;
    let admin = create_admin_and_login(&app).await;

    let response = app
        .delete("/tokens-invitacion/999999", &admin.token)
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
}
