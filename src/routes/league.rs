use actix_web::{guard, web};

use crate::handlers::{matches, players, stadiums, teams, tournaments};
use crate::middleware::{AdminMiddleware, AuthMiddleware};

pub fn init_league_routes(cfg: &mut web::ServiceConfig) {
    // Team, stadium and player maintenance is admin only
    cfg.service(
        web::scope("/equipos")
            .wrap(AdminMiddleware)
            .service(
                web::resource("")
                    .route(web::get().to(teams::list_teams))
                    .route(web::post().to(teams::create_team)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(teams::get_team))
                    .route(web::put().to(teams::update_team))
                    .route(web::delete().to(teams::delete_team)),
            ),
    );

    cfg.service(
        web::scope("/estadios")
            .wrap(AdminMiddleware)
            .service(
                web::resource("")
                    .route(web::get().to(stadiums::list_stadiums))
                    .route(web::post().to(stadiums::create_stadium)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(stadiums::get_stadium))
                    .route(web::put().to(stadiums::update_stadium))
                    .route(web::delete().to(stadiums::delete_stadium)),
            ),
    );

    cfg.service(
        web::scope("/players")
            .wrap(AdminMiddleware)
            .route("/data/countries", web::get().to(players::list_countries))
            .route("/data/positions", web::get().to(players::list_positions))
            .service(
                web::resource("")
                    .route(web::get().to(players::list_players))
                    .route(web::post().to(players::create_player)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(players::get_player))
                    .route(web::put().to(players::update_player))
                    .route(web::delete().to(players::delete_player)),
            ),
    );

    // Tournaments and matches: any signed-in user reads, admins write.
    // A GET-guarded resource is tried first; anything else falls through to the admin one.
    cfg.service(
        web::scope("/torneos")
            .service(
                web::resource("/data/paises")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(tournaments::list_countries)),
            )
            .service(
                web::resource("/data/positions")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(tournaments::list_positions)),
            )
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .wrap(AuthMiddleware)
                    .route(web::get().to(tournaments::list_tournaments)),
            )
            .service(
                web::resource("")
                    .wrap(AdminMiddleware)
                    .route(web::post().to(tournaments::create_tournament)),
            )
            .service(
                web::resource("/{id}")
                    .guard(guard::Get())
                    .wrap(AuthMiddleware)
                    .route(web::get().to(tournaments::get_tournament)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(AdminMiddleware)
                    .route(web::put().to(tournaments::update_tournament))
                    .route(web::delete().to(tournaments::delete_tournament)),
            ),
    );

    cfg.service(
        web::scope("/partidos")
            .service(
                web::resource("/data/torneos")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(matches::list_tournament_options)),
            )
            .service(
                web::resource("/data/equipos")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(matches::list_team_options)),
            )
            .service(
                web::resource("/data/estadios")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(matches::list_stadium_options)),
            )
            .service(
                web::resource("")
                    .guard(guard::Get())
                    .wrap(AuthMiddleware)
                    .route(web::get().to(matches::list_matches)),
            )
            .service(
                web::resource("")
                    .wrap(AdminMiddleware)
                    .route(web::post().to(matches::create_match)),
            )
            .service(
                web::resource("/{id}")
                    .guard(guard::Get())
                    .wrap(AuthMiddleware)
                    .route(web::get().to(matches::get_match)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(AdminMiddleware)
                    .route(web::put().to(matches::update_match))
                    .route(web::delete().to(matches::delete_match)),
            ),
    );
}
