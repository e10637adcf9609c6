//! Persistence contracts, one per resource, with their Postgres implementations.
//!
//! Services only ever see the `Arc<dyn ...Repository>` handles in [`Repositories`].

pub mod analytics;
pub mod badges;
pub mod bookmarks;
pub mod categories;
pub mod relations;
pub mod reports;
pub mod reviews;
pub mod tags;
pub mod tools;
pub mod users;

use sqlx::PgPool;
use std::sync::Arc;

pub use analytics::{AnalyticsRepository, OverviewStats, TopCategory, TopTool, TopToolOrder};
pub use badges::BadgeRepository;
pub use bookmarks::BookmarkRepository;
pub use categories::{CategoryRepository, NewCategory};
pub use reports::{NewReport, ReportFilter, ReportRepository};
pub use reviews::{NewReview, ReviewRepository, ReviewSort};
pub use tags::TagRepository;
pub use tools::{NewTool, PriceFilter, ToolFilter, ToolRepository, ToolSort};
pub use users::UserRepository;

/// The full set of repository handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub tools: Arc<dyn ToolRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub badges: Arc<dyn BadgeRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub users: Arc<dyn UserRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tools: Arc::new(tools::PgToolRepository::new(pool.clone())),
            categories: Arc::new(categories::PgCategoryRepository::new(pool.clone())),
            tags: Arc::new(tags::PgTagRepository::new(pool.clone())),
            badges: Arc::new(badges::PgBadgeRepository::new(pool.clone())),
            reviews: Arc::new(reviews::PgReviewRepository::new(pool.clone())),
            bookmarks: Arc::new(bookmarks::PgBookmarkRepository::new(pool.clone())),
            reports: Arc::new(reports::PgReportRepository::new(pool.clone())),
            users: Arc::new(users::PgUserRepository::new(pool.clone())),
            analytics: Arc::new(analytics::PgAnalyticsRepository::new(pool)),
        }
    }
}
