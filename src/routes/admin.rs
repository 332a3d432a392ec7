/// Admin Routes
///
/// Fileserver metrics and the development-only reset.

use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::{AppError, AuthError};
use crate::metrics::HitCounter;
use crate::store::Store;

fn metrics_page(hits: u64) -> String {
    format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>\n",
        hits
    )
}

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(metrics_page(counter.get()))
}

/// POST /admin/reset
///
/// Wipes all users (and with them chirps and refresh tokens) and zeroes the
/// hit counter.
///
/// # Errors
/// - 403: not running on the `dev` platform
pub async fn reset(
    store: web::Data<dyn Store>,
    counter: web::Data<HitCounter>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if !application.is_dev() {
        tracing::warn!(platform = %application.platform, "Reset refused outside dev");
        return Err(AuthError::PermissionDenied.into());
    }

    store.reset().await?;
    counter.reset();

    tracing::info!("State reset");
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hits reset to 0 and database reset to initial state."))
}
