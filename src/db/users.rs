use sqlx::{PgConnection, PgPool};

use crate::models::user::{CurrentUser, NewUser, UserCredentials, UserProfile};

const PROFILE_COLUMNS: &str = r#"
    id_usuario, username, email, nombre_completo, role, puede_apostar, activo,
    fecha_creacion, ultimo_acceso
"#;

pub async fn find_current_user(pool: &PgPool, id_usuario: i32) -> Result<Option<CurrentUser>, sqlx::Error> {
    sqlx::query_as::<_, CurrentUser>(
        "SELECT id_usuario, username, role, puede_apostar, activo FROM usuarios WHERE id_usuario = $1",
    )
    .bind(id_usuario)
    .fetch_optional(pool)
    .await
}

pub async fn find_profile(pool: &PgPool, id_usuario: i32) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {} FROM usuarios WHERE id_usuario = $1",
        PROFILE_COLUMNS
    ))
    .bind(id_usuario)
    .fetch_optional(pool)
    .await
}

pub async fn list_profiles(pool: &PgPool) -> Result<Vec<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {} FROM usuarios ORDER BY fecha_creacion DESC, id_usuario DESC",
        PROFILE_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_credentials_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as::<_, UserCredentials>(
        "SELECT id_usuario, password_hash, activo FROM usuarios WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn find_credentials(
    pool: &PgPool,
    id_usuario: i32,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as::<_, UserCredentials>(
        "SELECT id_usuario, password_hash, activo FROM usuarios WHERE id_usuario = $1",
    )
    .bind(id_usuario)
    .fetch_optional(pool)
    .await
}

/// True when either the username or the (optional) email already belongs to an account.
pub async fn username_or_email_taken(
    pool: &PgPool,
    username: &str,
    email: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let taken: Option<i32> = sqlx::query_scalar(
        r#"
        SELECT id_usuario FROM usuarios
        WHERE LOWER(username) = LOWER($1) OR ($2::VARCHAR IS NOT NULL AND LOWER(email) = LOWER($2))
        LIMIT 1
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(taken.is_some())
}

pub async fn insert_user(conn: &mut PgConnection, user: &NewUser<'_>) -> Result<UserProfile, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(&format!(
        r#"
        INSERT INTO usuarios (username, email, password_hash, nombre_completo, role, puede_apostar, activo)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE)
        RETURNING {}
        "#,
        PROFILE_COLUMNS
    ))
    .bind(user.username)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.nombre_completo)
    .bind(user.role)
    .bind(user.puede_apostar)
    .fetch_one(conn)
    .await
}

pub async fn touch_last_access(pool: &PgPool, id_usuario: i32) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(&format!(
        "UPDATE usuarios SET ultimo_acceso = NOW() WHERE id_usuario = $1 RETURNING {}",
        PROFILE_COLUMNS
    ))
    .bind(id_usuario)
    .fetch_optional(pool)
    .await
}

pub async fn update_password_hash(
    pool: &PgPool,
    id_usuario: i32,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE usuarios SET password_hash = $2 WHERE id_usuario = $1")
        .bind(id_usuario)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn toggle_active(pool: &PgPool, id_usuario: i32) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(&format!(
        "UPDATE usuarios SET activo = NOT activo WHERE id_usuario = $1 RETURNING {}",
        PROFILE_COLUMNS
    ))
    .bind(id_usuario)
    .fetch_optional(pool)
    .await
}

/// Bets, ledger rows and issued invitations all keep an account alive.
pub async fn count_user_references(pool: &PgPool, id_usuario: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT
            (SELECT COUNT(*) FROM apuestas_usuarios WHERE id_usuario = $1)
          + (SELECT COUNT(*) FROM historial_puntos WHERE id_usuario = $1)
          + (SELECT COUNT(*) FROM tokens_invitacion WHERE creado_por = $1)
        "#,
    )
    .bind(id_usuario)
    .fetch_one(pool)
    .await
}

pub async fn delete_user(pool: &PgPool, id_usuario: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
        .bind(id_usuario)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
