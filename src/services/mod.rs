pub mod analytics_service;
pub mod auth_service;
pub mod badge_service;
pub mod bookmark_service;
pub mod category_service;
pub mod moderation_service;
pub mod review_service;
pub mod tag_service;
pub mod tool_service;

pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use badge_service::BadgeService;
pub use bookmark_service::BookmarkService;
pub use category_service::CategoryService;
pub use moderation_service::ModerationService;
pub use review_service::ReviewService;
pub use tag_service::TagService;
pub use tool_service::ToolService;
