use once_cell::sync::Lazy;
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use uuid::Uuid;

use liga_backend::config::settings::{get_config, get_jwt_settings, DatabaseSettings};
use liga_backend::run;
use liga_backend::telemetry::{get_subscriber, init_subscriber};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn put(&self, path: &str, token: &str, body: &Value) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token).json(body)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }
}

pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_config().expect("Failed to read configuration.");
    configuration.database.db_name = Uuid::new_v4().to_string();
    configuration.database.db_url = None;
    let connection_pool = configure_db(&configuration.database).await;
    let jwt_settings = get_jwt_settings(&configuration);

    let server = run(
        listener,
        connection_pool.clone(),
        jwt_settings,
        configuration.application,
    )
    .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
        client: Client::new(),
    }
}

pub async fn configure_db(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(config.connection_string_without_db().expose_secret())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.db_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect(config.connection_string().expose_secret())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

pub struct UserRegLoginResponse {
    pub token: String,
    pub user_id: i32,
    pub username: String,
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn register_user(app: &TestApp, username: &str, password: &str) -> reqwest::Response {
    app.client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": username,
            "password": password,
            "email": format!("{}@example.com", username)
        }))
        .send()
        .await
        .expect("Failed to execute register request.")
}

pub async fn login(app: &TestApp, username: &str, password: &str) -> reqwest::Response {
    app.client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to execute login request.")
}

/// Register a regular user and return its token.
pub async fn create_user_and_login(app: &TestApp) -> UserRegLoginResponse {
    let username = unique_username("user");
    let password = "password123";

    let response = register_user(app, &username, password).await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = login(app, &username, password)
        .await
        .json()
        .await
        .expect("Failed to parse login response");

    UserRegLoginResponse {
        token: body["token"].as_str().expect("No token in response").to_string(),
        user_id: body["user"]["id_usuario"].as_i64().expect("No user id") as i32,
        username,
    }
}

/// Register a user, promote it to admin with direct database access, then log in again so the
/// token carries the new role.
pub async fn create_admin_and_login(app: &TestApp) -> UserRegLoginResponse {
    let username = unique_username("admin");
    let password = "password123";

    let response = register_user(app, &username, password).await;
    assert_eq!(201, response.status().as_u16());

    sqlx::query("UPDATE usuarios SET role = 'admin' WHERE username = $1")
        .bind(&username)
        .execute(&app.db_pool)
        .await
        .expect("Failed to promote user to admin");

    let body: Value = login(app, &username, password)
        .await
        .json()
        .await
        .expect("Failed to parse login response");

    UserRegLoginResponse {
        token: body["token"].as_str().expect("No token in response").to_string(),
        user_id: body["user"]["id_usuario"].as_i64().expect("No user id") as i32,
        username,
    }
}
