// Router configuration: page routes, the JSON API, static assets, and
// middleware (compression, request tracing).

use axum::{
    extract::State,
    routing::{get, MethodRouter},
    Router,
};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::context::SharedContext;
use crate::handlers;

/// Hand-written pages served verbatim from the templates directory.
pub const STATIC_PAGES: &[&str] = &[
    "blog.html",
    "roster.html",
    "abs.html",
    "about.html",
    "bts.html",
];

fn static_route(file: &'static str) -> MethodRouter<SharedContext> {
    get(move |State(ctx): State<SharedContext>| handlers::static_page(ctx, file))
}

/// Create the application router with all routes and middleware.
pub fn create_router(ctx: SharedContext) -> Router {
    let static_dir = ctx.path(&ctx.config.data.static_dir);

    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/home", get(handlers::index))
        .route("/shift.html", get(handlers::shift))
        .route("/statcast.html", get(handlers::statcast))
        .route(
            "/scouting.html",
            get(handlers::scouting_default).post(handlers::scouting_submit),
        )
        .route("/api/splits", get(handlers::api_splits))
        .route("/health", get(handlers::health_check));

    for &file in STATIC_PAGES {
        router = router.route(&format!("/{file}"), static_route(file));
    }

    router
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
