use crate::{
    api::{attendance, dashboard, leave_request, schedule},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, middleware::from_fn, web};

/// Liveness probe
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .map(|cfg| Governor::new(&cfg))
}

/// Attendance, leave, dashboard and schedule routes under the API prefix.
pub fn configure_api(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(auth_middleware))
            .service(
                web::scope("/attendance")
                    .route("/checkin", web::post().to(attendance::check_in))
                    .route("/checkout", web::post().to(attendance::check_out))
                    .route("/today", web::get().to(attendance::today))
                    .route("/history", web::get().to(attendance::history)),
            )
            .service(
                web::scope("/leave-requests")
                    // /leave-requests
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // must precede /{id}
                    .route("/my-requests", web::get().to(leave_request::my_requests))
                    .route("/{id}", web::get().to(leave_request::get_leave))
                    .route("/{id}/status", web::patch().to(leave_request::decide_leave)),
            )
            .route("/dashboard/summary", web::get().to(dashboard::summary))
            .service(
                web::resource("/schedule-config")
                    .route(web::get().to(schedule::get_schedule))
                    .route(web::put().to(schedule::update_schedule)),
            ),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.route("/health", web::get().to(health));

    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => {
            cfg.service(
                web::scope("")
                    .wrap(limiter) // rate limiting
                    .configure(|c| configure_api(c, &config.api_prefix)),
            );
        }
        None => {
            tracing::warn!("Rate limiter configuration rejected; serving without rate limiting");
            configure_api(cfg, &config.api_prefix);
        }
    }
}
