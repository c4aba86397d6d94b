// Route exports
pub mod comparison;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/comparison")
            .configure(comparison::configure),
    );
}
