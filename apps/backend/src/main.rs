use std::process;

use actix_web::{web, App, HttpServer};
use db_infra::config::db::{DbKind, RuntimeEnv};
use draft_backend::middleware::{
    cors_middleware, RequestTrace, SecurityHeaders, StructuredLogger, TraceSpan,
};
use draft_backend::{build_state, routes, telemetry, DraftSettings};
use tracing::{error, info};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn exit_with(message: impl std::fmt::Display) -> ! {
    error!(%message, "startup failed");
    eprintln!("{message}");
    process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment comes from the runtime (compose env_file, or `set -a; . ./.env`).
    let host = env_or("BACKEND_HOST", "0.0.0.0");
    let port = env_or("BACKEND_PORT", "3001")
        .parse::<u16>()
        .unwrap_or_else(|_| exit_with("BACKEND_PORT must be a valid port number"));
    let db_kind = env_or("DRAFT_DB_KIND", "postgres")
        .parse::<DbKind>()
        .unwrap_or_else(|err| exit_with(err));
    let settings = DraftSettings::from_env().unwrap_or_else(|err| exit_with(err));
    let redis_url = std::env::var("REDIS_URL").ok();

    let app_state = build_state()
        .with_env(RuntimeEnv::Prod)
        .with_db(db_kind)
        .with_settings(settings)
        .with_redis(redis_url)
        .build()
        .await
        .unwrap_or_else(|err| exit_with(format!("Failed to build application state: {err}")));

    info!(
        %host,
        port,
        db_kind = %db_kind,
        undo_window_secs = settings.undo_window.whole_seconds(),
        room_ttl_secs = settings.room_ttl.whole_seconds(),
        "starting draft backend"
    );

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(SecurityHeaders)
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
