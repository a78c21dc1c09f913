use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::models::invitation::{InvitationListRow, InvitationToken};

pub async fn insert_token(
    pool: &PgPool,
    token: &str,
    creado_por: i32,
    fecha_expiracion: DateTime<Utc>,
) -> Result<InvitationToken, sqlx::Error> {
    sqlx::query_as::<_, InvitationToken>(
        r#"
        INSERT INTO tokens_invitacion (token, creado_por, fecha_expiracion)
        VALUES ($1, $2, $3)
        RETURNING id_token, token, usado, fecha_expiracion
        "#,
    )
    .bind(token)
    .bind(creado_por)
    .bind(fecha_expiracion)
    .fetch_one(pool)
    .await
}

pub async fn find_token(pool: &PgPool, token: &str) -> Result<Option<InvitationToken>, sqlx::Error> {
    sqlx::query_as::<_, InvitationToken>(
        "SELECT id_token, token, usado, fecha_expiracion FROM tokens_invitacion WHERE token = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

/// Same lookup as [`find_token`], but locks the row so two registrations cannot share a token.
pub async fn find_token_for_update(
    conn: &mut PgConnection,
    token: &str,
) -> Result<Option<InvitationToken>, sqlx::Error> {
    sqlx::query_as::<_, InvitationToken>(
        r#"
        SELECT id_token, token, usado, fecha_expiracion
        FROM tokens_invitacion
        WHERE token = $1
        FOR UPDATE
        "#,
    )
    .bind(token)
    .fetch_optional(conn)
    .await
}

pub async fn mark_used(
    conn: &mut PgConnection,
    id_token: i32,
    id_usuario_creado: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE tokens_invitacion
        SET usado = TRUE, id_usuario_creado = $2, fecha_uso = NOW()
        WHERE id_token = $1
        "#,
    )
    .bind(id_token)
    .bind(id_usuario_creado)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_tokens(pool: &PgPool) -> Result<Vec<InvitationListRow>, sqlx::Error> {
    sqlx::query_as::<_, InvitationListRow>(
        r#"
        SELECT
            ti.id_token,
            ti.token,
            ti.usado,
            ti.fecha_creacion,
            ti.fecha_uso,
            ti.fecha_expiracion,
            creador.username AS creado_por_username,
            creador.nombre_completo AS creado_por_nombre,
            creado.username AS usuario_creado_username,
            creado.nombre_completo AS usuario_creado_nombre
        FROM tokens_invitacion ti
        INNER JOIN usuarios creador ON ti.creado_por = creador.id_usuario
        LEFT JOIN usuarios creado ON ti.id_usuario_creado = creado.id_usuario
        ORDER BY ti.fecha_creacion DESC, ti.id_token DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn delete_token(pool: &PgPool, id_token: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tokens_invitacion WHERE id_token = $1")
        .bind(id_token)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
