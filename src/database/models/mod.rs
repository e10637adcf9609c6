pub mod badge;
pub mod bookmark;
pub mod category;
pub mod media;
pub mod moderation;
pub mod report;
pub mod review;
pub mod tag;
pub mod tool;
pub mod user;

pub use badge::Badge;
pub use bookmark::{Bookmark, BookmarkOwner, BookmarkRow};
pub use category::{Category, CategoryWithCount};
pub use media::{Media, MediaType};
pub use moderation::{
    ModeratedReview, ModerationAction, ModerationActionType, ModerationHistoryEntry,
    ModeratorBrief, QueuedReport,
};
pub use report::{Report, ReportReason, ReportRow, ReportStatus, ReportTarget, ReportableType};
pub use review::{ModerationStatus, Review, ReviewerBrief, ToolBrief};
pub use tag::{Tag, TagWithCount};
pub use tool::{RelationshipType, Tool, ToolDetail};
pub use user::{User, UserResponse, UserRole};
