use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtError, JwtKeys};
use crate::config::AppConfig;
use crate::database::Repositories;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{optional_auth, require_admin, require_auth};
use crate::services::{
    AnalyticsService, AuthService, BadgeService, BookmarkService, CategoryService,
    ModerationService, ReviewService, TagService, ToolService,
};

/// Everything a handler can reach: read-only config plus one service per resource.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub tools: Arc<ToolService>,
    pub categories: Arc<CategoryService>,
    pub tags: Arc<TagService>,
    pub badges: Arc<BadgeService>,
    pub reviews: Arc<ReviewService>,
    pub moderation: Arc<ModerationService>,
    pub bookmarks: Arc<BookmarkService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories) -> Result<Self, JwtError> {
        let keys = JwtKeys::from_config(&config.security)?;

        Ok(Self {
            auth: Arc::new(AuthService::new(repos.users.clone(), keys)),
            tools: Arc::new(ToolService::new(repos.tools.clone())),
            categories: Arc::new(CategoryService::new(
                repos.categories.clone(),
                repos.tools.clone(),
            )),
            tags: Arc::new(TagService::new(repos.tags.clone())),
            badges: Arc::new(BadgeService::new(repos.badges.clone(), repos.tools.clone())),
            reviews: Arc::new(ReviewService::new(repos.reviews.clone(), repos.tools.clone())),
            moderation: Arc::new(ModerationService::new(
                repos.reports.clone(),
                repos.reviews.clone(),
                repos.tools.clone(),
            )),
            bookmarks: Arc::new(BookmarkService::new(repos.bookmarks, repos.tools)),
            analytics: Arc::new(AnalyticsService::new(repos.analytics)),
            config: Arc::new(config),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(optional_auth_routes(&state))
        .merge(protected_routes(&state))
        .nest("/admin", admin_routes(&state));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        // Global middleware
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, categories, reviews, tools};

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/categories", get(categories::list))
        .route("/categories/:slug/tools", get(categories::tools))
        .route("/tools", get(tools::list))
        .route("/tools/:slug", get(tools::show))
        .route("/tools/:slug/alternatives", get(tools::alternatives))
        .route("/tools/:slug/reviews", get(reviews::list))
        .route("/search/tools", get(tools::search))
}

fn optional_auth_routes(state: &AppState) -> Router<AppState> {
    use public::{bookmarks, reports};

    Router::new()
        .route("/me/bookmarks", get(bookmarks::list).post(bookmarks::add))
        .route("/me/bookmarks/:tool_id", axum::routing::delete(bookmarks::remove))
        .route("/tools/:slug/report", post(reports::report_tool))
        .route("/reviews/:id/report", post(reports::report_review))
        .route_layer(from_fn_with_state(state.clone(), optional_auth))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use protected::{me, reviews};

    Router::new()
        .route("/me", get(me::show))
        .route("/me/reviews", get(me::reviews))
        .route("/tools/:slug/reviews", post(reviews::create))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use elevated::admin::{analytics, badges, categories, moderation, tags, tools};

    Router::new()
        // Tools
        .route("/tools", get(tools::list).post(tools::create))
        .route(
            "/tools/:id",
            get(tools::show).patch(tools::update).delete(tools::archive),
        )
        .route("/tools/:id/badges", get(badges::for_tool).post(badges::assign))
        .route(
            "/tools/:id/badges/:badge_id",
            axum::routing::delete(badges::remove),
        )
        // Categories
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::show)
                .patch(categories::update)
                .delete(categories::delete),
        )
        // Tags
        .route("/tags", get(tags::list).post(tags::create))
        .route(
            "/tags/:id",
            get(tags::show).patch(tags::update).delete(tags::delete),
        )
        // Badges
        .route("/badges", get(badges::list))
        // Analytics
        .route("/analytics/overview", get(analytics::overview))
        .route("/analytics/top-tools", get(analytics::top_tools))
        .route("/analytics/top-categories", get(analytics::top_categories))
        // Moderation
        .route("/moderation/queue", get(moderation::queue))
        .route("/moderation/reports", get(moderation::reports))
        .route(
            "/moderation/reports/:id",
            get(moderation::report).patch(moderation::update_report),
        )
        .route("/moderation/reviews/:id/approve", patch(moderation::approve))
        .route("/moderation/reviews/:id/hide", patch(moderation::hide))
        .route("/moderation/reviews/:id/remove", patch(moderation::remove))
        .route("/moderation/history/:review_id", get(moderation::history))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// `*` in the allow-list mirrors whatever origin the browser sent.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| tracing::warn!("Ignoring unusable CORS origin {:?}", origin))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ])
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
