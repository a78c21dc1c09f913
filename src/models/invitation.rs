use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvitationToken {
    pub id_token: i32,
    pub token: String,
    pub usado: bool,
    pub fecha_expiracion: DateTime<Utc>,
}

impl InvitationToken {
    pub fn status_at(&self, now: DateTime<Utc>) -> InvitationStatus {
        InvitationStatus::of(self.usado, self.fecha_expiracion, now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Activo,
    Usado,
    Expirado,
}

impl InvitationStatus {
    /// A used token stays `usado` even after it would have expired.
    pub fn of(usado: bool, fecha_expiracion: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if usado {
            InvitationStatus::Usado
        } else if now > fecha_expiracion {
            InvitationStatus::Expirado
        } else {
            InvitationStatus::Activo
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvitationListRow {
    pub id_token: i32,
    pub token: String,
    pub usado: bool,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_uso: Option<DateTime<Utc>>,
    pub fecha_expiracion: DateTime<Utc>,
    pub creado_por_username: String,
    pub creado_por_nombre: Option<String>,
    pub usuario_creado_username: Option<String>,
    pub usuario_creado_nombre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvitationView {
    #[serde(flatten)]
    pub fila: InvitationListRow,
    pub estado: InvitationStatus,
    #[serde(rename = "invitationLink")]
    pub invitation_link: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInvitation {
    pub message: String,
    pub token: String,
    pub invitation_link: String,
    pub fecha_expiracion: DateTime<Utc>,
}
