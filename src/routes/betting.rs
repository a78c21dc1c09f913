use actix_web::{guard, web};

use crate::handlers::{bets, betting_config, odds, predictions, standings};
use crate::middleware::{AdminMiddleware, AuthMiddleware};

pub fn init_betting_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apuestas")
            .service(
                web::resource("")
                    .wrap(AuthMiddleware)
                    .route(web::post().to(bets::create_bet)),
            )
            .service(
                web::resource("/batch")
                    .wrap(AuthMiddleware)
                    .route(web::post().to(bets::create_bets_batch)),
            )
            .service(
                web::resource("/mis-apuestas")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(bets::my_bets)),
            )
            .service(
                web::resource("/estadisticas")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(bets::my_stats)),
            )
            .service(
                web::resource("/torneos-fechas")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(bets::my_tournaments)),
            )
            .service(
                web::resource("/liquidar/{id_partido}")
                    .wrap(AdminMiddleware)
                    .route(web::post().to(bets::settle_match)),
            )
            .service(
                web::resource("/admin/usuarios-torneo/{id_torneo}")
                    .wrap(AdminMiddleware)
                    .route(web::get().to(bets::tournament_bettors)),
            )
            .service(
                web::resource("/admin/limpiar/{id_usuario}/{id_torneo}")
                    .wrap(AdminMiddleware)
                    .route(web::delete().to(bets::clean_user_bets)),
            ),
    );

    cfg.service(
        web::scope("/cuotas")
            .service(
                web::resource("/partidos")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(odds::bettable_matches)),
            )
            .service(
                web::resource("/partidos-sin-apostar")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(odds::matches_without_bet)),
            )
            .service(
                web::resource("/partido/{id}")
                    .guard(guard::Get())
                    .wrap(AuthMiddleware)
                    .route(web::get().to(odds::match_odds)),
            )
            .service(
                web::resource("/partido/{id}")
                    .wrap(AdminMiddleware)
                    .route(web::post().to(odds::set_match_odds)),
            ),
    );

    cfg.service(
        web::scope("/config-apuestas")
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .route(web::get().to(betting_config::get_config)),
            )
            .service(
                web::resource("")
                    .wrap(AdminMiddleware)
                    .route(web::put().to(betting_config::update_config)),
            )
            .service(
                web::resource("/torneos-fechas")
                    .wrap(AdminMiddleware)
                    .route(web::get().to(betting_config::tournaments_with_rounds)),
            )
            .service(
                web::resource("/partidos/{id_torneo}/{fecha}")
                    .wrap(AdminMiddleware)
                    .route(web::get().to(betting_config::round_matches)),
            ),
    );

    cfg.service(
        web::scope("/pronosticos")
            .wrap(AuthMiddleware)
            .route("", web::get().to(predictions::all_predictions))
            .route("/tabla-posiciones", web::get().to(standings::standings_table))
            .route("/torneos-disponibles", web::get().to(predictions::available_tournaments))
            .route("/fechas-torneo/{id_torneo}", web::get().to(predictions::tournament_rounds))
            .route("/ultima-fecha", web::get().to(predictions::latest_round))
            .route("/apuestas-por-partido", web::get().to(predictions::predictions_by_match)),
    );
}
