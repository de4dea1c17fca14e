// Route exports
pub mod deck;

use actix_web::web;

pub use deck::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(deck::configure),
    );
}
