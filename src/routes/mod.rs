use actix_web::web;

pub mod auth;
pub mod betting;
pub mod league;

use crate::handlers::health;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health))
            .configure(auth::init_auth_routes)
            .configure(league::init_league_routes)
            .configure(betting::init_betting_routes),
    );
}
