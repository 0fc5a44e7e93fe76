// HTTP handlers, one per page. SQLite and file reads run on the blocking
// pool.

use axum::{
    extract::{Query, State},
    response::Html,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use moneyball_core::overview::{load_page_data, PageData};
use moneyball_core::splits::SplitsResult;

use crate::chart;
use crate::context::SharedContext;
use crate::error::{ApiFailure, AppError};
use crate::html;

pub type PageResult = Result<Html<String>, AppError>;

/// Run blocking work on the blocking pool, flattening join failures.
async fn blocking<T, E, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(Into::into),
        Err(join_err) => Err(AppError::Internal(anyhow::anyhow!(
            "blocking task failed: {join_err}"
        ))),
    }
}

async fn load_data(ctx: &SharedContext, configured: &str) -> Result<PageData, AppError> {
    let path = ctx.path(configured);
    blocking(move || load_page_data(&path)).await
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Pages
// =============================================================================

/// GET / and GET /home
///
/// Overview tables from `query_results.json` plus a random quote.
pub async fn index(State(ctx): State<SharedContext>) -> PageResult {
    let data = load_data(&ctx, &ctx.config.data.query_results).await?;
    let quote = ctx.quotes.random();
    Ok(Html(html::home_page(quote, &data)))
}

/// GET /statcast.html
pub async fn statcast(State(ctx): State<SharedContext>) -> PageResult {
    let data = load_data(&ctx, &ctx.config.data.query_results).await?;
    Ok(Html(html::statcast_page(&data)))
}

/// GET /shift.html
///
/// Figures pre-rendered offline into `saved_figs.json`.
pub async fn shift(State(ctx): State<SharedContext>) -> PageResult {
    let figures = load_data(&ctx, &ctx.config.data.saved_figs).await?;
    Ok(Html(html::shift_page(&figures)))
}

/// Serve a hand-written page from the templates directory unchanged.
pub async fn static_page(ctx: SharedContext, file: &'static str) -> PageResult {
    let path = ctx.path(&ctx.config.data.templates_dir).join(file);
    let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
        debug!("failed to read {}: {e}", path.display());
        AppError::NotFound(format!("page {file} not found"))
    })?;
    Ok(Html(contents))
}

// =============================================================================
// Scouting
// =============================================================================

/// Form fields posted by the scouting page; both optional.
#[derive(Debug, Default, Deserialize)]
pub struct ScoutingForm {
    pub player: Option<String>,
    pub metric: Option<String>,
}

async fn compute(ctx: &SharedContext, form: ScoutingForm) -> Result<SplitsResult, AppError> {
    let ctx = ctx.clone();
    blocking(move || {
        ctx.splits
            .compute_from_params(form.player.as_deref(), form.metric.as_deref())
    })
    .await
}

async fn render_scouting(ctx: &SharedContext, form: ScoutingForm) -> PageResult {
    let requested = form.player.clone().unwrap_or_default();
    let result = compute(ctx, form).await?;
    let figure = chart::scouting_figure(&result);
    Ok(Html(html::scouting_page(&result, &requested, &figure)))
}

/// GET /scouting.html
///
/// Default player and metric.
pub async fn scouting_default(State(ctx): State<SharedContext>) -> PageResult {
    render_scouting(&ctx, ScoutingForm::default()).await
}

/// POST /scouting.html
pub async fn scouting_submit(
    State(ctx): State<SharedContext>,
    Form(form): Form<ScoutingForm>,
) -> PageResult {
    render_scouting(&ctx, form).await
}

/// GET /api/splits?player=&metric=
///
/// The raw aggregator output as JSON.
pub async fn api_splits(
    State(ctx): State<SharedContext>,
    Query(query): Query<ScoutingForm>,
) -> Result<Json<SplitsResult>, ApiFailure> {
    let result = compute(&ctx, query).await?;
    Ok(Json(result))
}
