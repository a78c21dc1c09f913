use serde_json::{json, Value};

mod common;
use common::utils::{
    create_admin_and_login, create_user_and_login, login, register_user, spawn_app,
    unique_username,
};

#[tokio::test]
async fn register_returns_token_and_user() {
    let app = spawn_app().await;
    let username = unique_username("ana");

    let response = register_user(&app, &username, "secreto1").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Usuario registrado exitosamente");
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], username.as_str());
    assert_eq!(body["user"]["role"], "usuario");
    assert_eq!(body["user"]["puede_apostar"], true);
    // Full name defaults to the username
    assert_eq!(body["user"]["nombre_completo"], username.as_str());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_taken_username() {
    let app = spawn_app().await;
    let username = unique_username("dup");

    assert_eq!(201, register_user(&app, &username, "secreto1").await.status().as_u16());
    let response = register_user(&app, &username, "secreto1").await;

    assert_eq!(409, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "El username o email ya está registrado");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = spawn_app().await;

    let response = register_user(&app, &unique_username("corta"), "123").await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn register_rejects_bad_username_characters() {
    let app = spawn_app().await;

    let response = register_user(&app, "con espacio", "secreto1").await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    let username = unique_username("luis");
    register_user(&app, &username, "secreto1").await;

    let response = login(&app, &username, "otro-secreto").await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Credenciales inválidas");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": "alguien" }))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn inactive_user_cannot_login() {
    let app = spawn_app().await;
    let username = unique_username("inactivo");
    register_user(&app, &username, "secreto1").await;
    sqlx::query("UPDATE usuarios SET activo = FALSE WHERE username = $1")
        .bind(&username)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = login(&app, &username, "secreto1").await;

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn profile_requires_a_token() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/auth/profile")).send().await.unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = spawn_app().await;

    let response = app.get("/auth/profile", "not-a-jwt").send().await.unwrap();

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Token inválido o expirado");
}

#[tokio::test]
async fn profile_returns_the_caller() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;

    let response = app.get("/auth/profile", &user.token).send().await.unwrap();

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id_usuario"], user.user_id);
    assert!(body["user"]["ultimo_acceso"].is_string());
}

#[tokio::test]
async fn token_of_deactivated_user_is_forbidden() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    sqlx::query("UPDATE usuarios SET activo = FALSE WHERE id_usuario = $1")
        .bind(user.user_id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app.get("/auth/profile", &user.token).send().await.unwrap();

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn change_password_checks_the_current_one() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;

    let wrong = app
        .put(
            "/auth/cambiar-password",
            &user.token,
            &json!({ "password_actual": "incorrecta", "password_nueva": "nueva123" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(401, wrong.status().as_u16());

    let ok = app
        .put(
            "/auth/cambiar-password",
            &user.token,
            &json!({ "password_actual": "password123", "password_nueva": "nueva123" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(200, ok.status().as_u16());

    assert_eq!(200, login(&app, &user.username, "nueva123").await.status().as_u16());
    assert_eq!(401, login(&app, &user.username, "password123").await.status().as_u16());
}

#[tokio::test]
async fn regular_user_is_kept_out_of_admin_scopes() {
    let app = spawn_app().await;
    let user = create_user_and_login(&app).await;
    let admin = create_admin_and_login(&app).await;

    let forbidden = app.get("/equipos", &user.token).send().await.unwrap();
    assert_eq!(403, forbidden.status().as_u16());

    let allowed = app.get("/equipos", &admin.token).send().await.unwrap();
    assert_eq!(200, allowed.status().as_u16());
}
