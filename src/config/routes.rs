use actix_web::web;

use crate::controllers::auth_controller;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(auth_controller::index))
        .route("/api/register", web::post().to(auth_controller::register))
        .route(
            "/api/verify-otp",
            web::post().to(auth_controller::verify_otp),
        )
        .route(
            "/api/resend-otp",
            web::post().to(auth_controller::resend_otp),
        )
        .route("/api/login", web::post().to(auth_controller::login))
        .route("/api/landing", web::get().to(auth_controller::landing))
        .route("/api/profile", web::get().to(auth_controller::profile));
}
