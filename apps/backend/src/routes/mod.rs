use actix_web::web;

pub mod health;
pub mod realtime;
pub mod rooms;

/// Every route the backend serves; `main` and the HTTP tests share this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes));
    cfg.service(
        web::scope("/api/rooms")
            .configure(rooms::configure_routes)
            .configure(realtime::configure_routes),
    );
}
