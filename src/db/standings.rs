use sqlx::PgPool;

use crate::models::betting::StandingsRow;

/// Per-user totals over bets in the given tournament and round; `None` means no filter.
pub async fn standings(
    pool: &PgPool,
    id_torneo: Option<i32>,
    numero_jornada: Option<i32>,
) -> Result<Vec<StandingsRow>, sqlx::Error> {
    sqlx::query_as::<_, StandingsRow>(
        r#"
        SELECT
            u.id_usuario,
            u.username,
            u.nombre_completo,
            COUNT(a.id_apuesta) AS total_apuestas,
            COUNT(*) FILTER (WHERE a.estado = 'ganada') AS apuestas_ganadas,
            COUNT(*) FILTER (WHERE a.estado = 'perdida') AS apuestas_perdidas,
            COUNT(*) FILTER (WHERE a.estado = 'pendiente') AS apuestas_pendientes,
            COALESCE(SUM(a.puntos_ganados), 0) AS puntos_totales,
            ROUND(
                CASE WHEN COUNT(a.id_apuesta) > 0
                    THEN COUNT(*) FILTER (WHERE a.estado = 'ganada') * 100.0 / COUNT(a.id_apuesta)
                    ELSE 0
                END,
                2
            ) AS porcentaje_aciertos
        FROM usuarios u
        INNER JOIN apuestas_usuarios a ON u.id_usuario = a.id_usuario
        INNER JOIN HECHOS_RESULTADOS p ON a.id_partido = p.ID_PARTIDO
        WHERE ($1::INTEGER IS NULL OR a.id_torneo = $1)
          AND ($2::INTEGER IS NULL OR p.NUMERO_JORNADA = $2)
        GROUP BY u.id_usuario, u.username, u.nombre_completo
        ORDER BY puntos_totales DESC, porcentaje_aciertos DESC, apuestas_ganadas DESC, u.username
        "#,
    )
    .bind(id_torneo)
    .bind(numero_jornada)
    .fetch_all(pool)
    .await
}
