use actix_web::HttpResponse;
use chrono::Utc;
use serde_json::json;

/// Liveness probe; never touches the database.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": Utc::now()
    }))
}
