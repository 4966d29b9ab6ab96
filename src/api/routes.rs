use actix_web::web;

use crate::api::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/metrics", web::get().to(handlers::metrics))
        .service(
            web::scope("/api")
                .route("/migrate", web::post().to(handlers::migrate))
                .route("/doctors", web::get().to(handlers::list_doctors))
                .route("/reports/revenue", web::get().to(handlers::revenue_report))
                .route(
                    "/patients/{email}/history",
                    web::get().to(handlers::patient_history),
                ),
        );
}
