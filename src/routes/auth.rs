use actix_web::web;

use crate::handlers::{auth, invitations, users};
use crate::middleware::{AdminMiddleware, AuthMiddleware};

pub fn init_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .service(
                web::resource("/profile")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(auth::profile)),
            )
            .service(
                web::resource("/cambiar-password")
                    .wrap(AuthMiddleware)
                    .route(web::put().to(auth::change_password)),
            ),
    );

    cfg.service(
        web::scope("/usuarios")
            .wrap(AdminMiddleware)
            .service(
                web::resource("")
                    .route(web::get().to(users::list_users))
                    .route(web::post().to(users::create_user)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(users::get_user))
                    .route(web::delete().to(users::delete_user)),
            )
            .service(
                web::resource("/{id}/toggle-activo")
                    .route(web::patch().to(users::toggle_active)),
            ),
    );

    // Validation is public so the register page can check a link before sign-up
    cfg.service(
        web::scope("/tokens-invitacion")
            .route("/validar/{token}", web::get().to(invitations::validate_invitation))
            .service(
                web::resource("")
                    .wrap(AdminMiddleware)
                    .route(web::get().to(invitations::list_invitations))
                    .route(web::post().to(invitations::create_invitation)),
            )
            .service(
                web::resource("/{id}")
                    .wrap(AdminMiddleware)
                    .route(web::delete().to(invitations::delete_invitation)),
            ),
    );
}
