use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::metrics::HitCounter;
use crate::middleware::HitCounterMiddleware;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::Store;

fn malformed_body(detail: String) -> actix_web::Error {
    AppError::Validation(ValidationError::MalformedBody(detail)).into()
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let store: web::Data<dyn Store> = web::Data::from(store);
    let jwt_config = web::Data::new(settings.jwt);
    let webhook_config = web::Data::new(settings.webhook);
    let static_dir = settings.application.static_dir.clone();
    let application = web::Data::new(settings.application);
    // One counter for every worker
    let counter = web::Data::new(HitCounter::new());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            // Shared state
            .app_data(store.clone())
            .app_data(jwt_config.clone())
            .app_data(webhook_config.clone())
            .app_data(application.clone())
            .app_data(counter.clone())
            // Extractor failures render as JSON 400s
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _req| malformed_body(err.to_string())),
            )
            .app_data(
                web::QueryConfig::default()
                    .error_handler(|err, _req| malformed_body(err.to_string())),
            )
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/users", web::put().to(update_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{chirp_id}", web::get().to(get_chirp))
                    .route("/chirps/{chirp_id}", web::delete().to(delete_chirp))
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            // Static files; every request here counts as a hit
            .service(
                web::scope("/app")
                    .wrap(HitCounterMiddleware::new(counter.clone()))
                    .service(fs::Files::new("/", static_dir.clone()).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
