//! In-memory repositories for service and router tests.
//!
//! [`MemoryStore`] implements every repository trait over one shared, mutex-guarded state,
//! mirroring the filtering and ordering of the Postgres implementations closely enough for
//! behavioural tests. Seeding helpers bypass the services.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::Page;
use crate::database::manager::{DatabaseError, DbResult};
use crate::database::models::{
    Badge, BookmarkOwner, BookmarkRow, Category, CategoryWithCount, Media, ModerationAction,
    ModerationActionType, ModerationStatus, RelationshipType, Report, ReportStatus, ReportTarget,
    Review, Tag, TagWithCount, Tool, ToolDetail, User, UserRole,
};
use crate::database::repositories::{
    AnalyticsRepository, BadgeRepository, BookmarkRepository, CategoryRepository, NewCategory,
    NewReport, NewReview, NewTool, OverviewStats, PriceFilter, ReportFilter, ReportRepository,
    Repositories, ReviewRepository, ReviewSort, TagRepository, ToolFilter, ToolRepository,
    ToolSort, TopCategory, TopTool, TopToolOrder, UserRepository,
};

struct Alternative {
    id: i64,
    tool_id: i64,
    alternative_id: i64,
    kind: RelationshipType,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    categories: Vec<Category>,
    tools: Vec<Tool>,
    tags: Vec<Tag>,
    tool_tags: Vec<(i64, i64)>,
    badges: Vec<Badge>,
    tool_badges: Vec<(i64, i64)>,
    media: Vec<Media>,
    alternatives: Vec<Alternative>,
    reviews: Vec<Review>,
    bookmarks: Vec<BookmarkRow>,
    reports: Vec<Report>,
    actions: Vec<ModerationAction>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn tool_mut(&mut self, id: i64) -> Option<&mut Tool> {
        self.tools.iter_mut().find(|t| t.id == id)
    }

    fn display_name(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.display_name.clone())
            .unwrap_or_default()
    }

    /// Re-apply the joins the Postgres query performs.
    fn joined(&self, review: &Review) -> Review {
        let mut review = review.clone();
        review.user_display_name = self.display_name(review.user_id);
        if let Some(tool) = self.tools.iter().find(|t| t.id == review.tool_id) {
            review.tool_slug = tool.slug.clone();
            review.tool_name = tool.name.clone();
            review.tool_logo_url = tool.logo_url.clone();
        }
        review
    }

    fn detail(&self, tool: Tool, with_media: bool) -> ToolDetail {
        let primary_category = self
            .categories
            .iter()
            .find(|c| c.id == tool.primary_category_id)
            .cloned();

        let mut tags: Vec<Tag> = self
            .tool_tags
            .iter()
            .filter(|(tool_id, _)| *tool_id == tool.id)
            .filter_map(|(_, tag_id)| self.tags.iter().find(|t| t.id == *tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        let mut badges: Vec<Badge> = self
            .tool_badges
            .iter()
            .filter(|(tool_id, _)| *tool_id == tool.id)
            .filter_map(|(_, badge_id)| self.badges.iter().find(|b| b.id == *badge_id).cloned())
            .collect();
        badges.sort_by(|a, b| a.name.cmp(&b.name));

        let media = with_media.then(|| {
            let mut media: Vec<Media> = self
                .media
                .iter()
                .filter(|m| m.tool_id == tool.id)
                .cloned()
                .collect();
            media.sort_by_key(|m| (m.display_order, m.id));
            media
        });

        ToolDetail {
            tool,
            primary_category,
            tags,
            badges,
            media,
        }
    }

    fn details(&self, tools: Vec<Tool>) -> Vec<ToolDetail> {
        tools.into_iter().map(|t| self.detail(t, false)).collect()
    }

    fn live_tool_count(&self, category_id: i64) -> i64 {
        self.tools
            .iter()
            .filter(|t| t.primary_category_id == category_id && !t.is_archived())
            .count() as i64
    }
}

fn contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn matches_filter(state: &State, tool: &Tool, filter: &ToolFilter) -> bool {
    if tool.is_archived() {
        return false;
    }
    if let Some(slug) = &filter.category {
        let in_category = state
            .categories
            .iter()
            .any(|c| &c.slug == slug && c.id == tool.primary_category_id);
        if !in_category {
            return false;
        }
    }
    let price_ok = match filter.price {
        Some(PriceFilter::Free) => {
            tool.has_free_tier
                && (contains_ci(&tool.pricing_summary, "free")
                    || contains_ci(&tool.pricing_summary, "$0"))
        }
        Some(PriceFilter::Freemium) => tool.has_free_tier,
        Some(PriceFilter::Paid) => !tool.has_free_tier,
        None => true,
    };
    if !price_ok {
        return false;
    }
    if let Some(min_rating) = filter.min_rating.filter(|r| *r > 0.0) {
        if tool.avg_rating_overall < min_rating {
            return false;
        }
    }
    if let Some(platform) = &filter.platform {
        if !contains_ci(&tool.platforms, &platform.to_lowercase()) {
            return false;
        }
    }
    if let Some(query) = filter.query.as_deref().filter(|q| !q.is_empty()) {
        let term = query.to_lowercase();
        let hit = tool.name.to_lowercase().contains(&term)
            || contains_ci(&tool.tagline, &term)
            || contains_ci(&tool.description, &term)
            || contains_ci(&tool.best_for, &term)
            || contains_ci(&tool.primary_use_cases, &term);
        if !hit {
            return false;
        }
    }
    true
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn newest_first(a: &Tool, b: &Tool) -> Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn sort_tools(tools: &mut [Tool], sort: ToolSort) {
    tools.sort_by(|a, b| match sort {
        ToolSort::TopRated => desc_f64(a.avg_rating_overall, b.avg_rating_overall)
            .then(b.review_count.cmp(&a.review_count))
            .then(a.id.cmp(&b.id)),
        ToolSort::MostBookmarked => b.bookmark_count.cmp(&a.bookmark_count).then(a.id.cmp(&b.id)),
        ToolSort::Trending => {
            desc_f64(a.trending_score, b.trending_score).then(a.id.cmp(&b.id))
        }
        ToolSort::Newest => newest_first(a, b),
    });
}

fn newest_review_first(a: &Review, b: &Review) -> Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

/// Shared in-memory backing for every repository trait.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository handles that all read and write this store.
    pub fn repositories(&self) -> Repositories {
        let store = Arc::new(self.clone());
        Repositories {
            tools: store.clone(),
            categories: store.clone(),
            tags: store.clone(),
            badges: store.clone(),
            reviews: store.clone(),
            bookmarks: store.clone(),
            reports: store.clone(),
            users: store.clone(),
            analytics: store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store poisoned")
    }

    pub fn seed_category(&self, slug: &str, name: &str) -> Category {
        let mut state = self.lock();
        let now = Utc::now();
        let category = Category {
            id: state.next_id(),
            slug: slug.into(),
            name: name.into(),
            description: None,
            icon_url: None,
            display_order: state.categories.len() as i32,
            created_at: now,
            updated_at: now,
        };
        state.categories.push(category.clone());
        category
    }

    pub fn seed_tool(&self, slug: &str, category_id: i64) -> Tool {
        self.seed_tool_with(slug, category_id, |_| {})
    }

    pub fn seed_tool_with(&self, slug: &str, category_id: i64, edit: impl FnOnce(&mut Tool)) -> Tool {
        let mut state = self.lock();
        let now = Utc::now();
        let mut tool = Tool {
            id: state.next_id(),
            slug: slug.into(),
            name: slug.into(),
            logo_url: None,
            tagline: None,
            description: None,
            best_for: None,
            primary_use_cases: None,
            pricing_summary: None,
            target_roles: None,
            platforms: None,
            has_free_tier: false,
            official_url: None,
            primary_category_id: category_id,
            avg_rating_overall: 0.0,
            review_count: 0,
            bookmark_count: 0,
            trending_score: 0.0,
            created_at: now,
            updated_at: now,
            archived_at: None,
        };
        edit(&mut tool);
        state.tools.push(tool.clone());
        tool
    }

    pub fn link_alternative(&self, tool_id: i64, alternative_id: i64, kind: RelationshipType) {
        let mut state = self.lock();
        let id = state.next_id();
        state.alternatives.push(Alternative {
            id,
            tool_id,
            alternative_id,
            kind,
        });
    }

    pub fn seed_tag(&self, slug: &str, name: &str) -> Tag {
        let mut state = self.lock();
        let tag = Tag {
            id: state.next_id(),
            slug: slug.into(),
            name: name.into(),
            created_at: Utc::now(),
        };
        state.tags.push(tag.clone());
        tag
    }

    pub fn tag_tool(&self, tool_id: i64, tag_id: i64) {
        self.lock().tool_tags.push((tool_id, tag_id));
    }

    pub fn seed_badge(&self, slug: &str, name: &str) -> Badge {
        let mut state = self.lock();
        let badge = Badge {
            id: state.next_id(),
            slug: slug.into(),
            name: name.into(),
            description: None,
            icon_url: None,
            created_at: Utc::now(),
        };
        state.badges.push(badge.clone());
        badge
    }

    pub fn seed_user(&self, email: &str, display_name: &str) -> User {
        self.seed_user_with_role(email, display_name, UserRole::User)
    }

    pub fn seed_user_with_role(&self, email: &str, display_name: &str, role: UserRole) -> User {
        let mut state = self.lock();
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            email: email.into(),
            password_hash: String::new(),
            display_name: display_name.into(),
            role,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        user
    }

    /// An approved review with placeholder text. Tool aggregates are left alone.
    pub fn seed_review(&self, tool_id: i64, user_id: i64, rating: i32) -> Review {
        let mut state = self.lock();
        let now = Utc::now();
        let review = Review {
            id: state.next_id(),
            tool_id,
            user_id,
            rating_overall: rating,
            rating_ease_of_use: None,
            rating_value: None,
            rating_accuracy: None,
            rating_speed: None,
            rating_support: None,
            pros: "Solid".into(),
            cons: "Pricey".into(),
            primary_use_case: None,
            reviewer_role: None,
            company_size: None,
            usage_context: None,
            helpful_count: 0,
            moderation_status: ModerationStatus::Approved,
            moderated_by: None,
            moderated_at: None,
            created_at: now,
            updated_at: now,
            user_display_name: String::new(),
            tool_slug: String::new(),
            tool_name: String::new(),
            tool_logo_url: None,
        };
        let review = state.joined(&review);
        state.reviews.push(review.clone());
        review
    }

    pub fn tool(&self, id: i64) -> Tool {
        self.lock()
            .tools
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .expect("seeded tool")
    }

    pub fn set_review_status(&self, id: i64, status: ModerationStatus) {
        if let Some(review) = self.lock().reviews.iter_mut().find(|r| r.id == id) {
            review.moderation_status = status;
        }
    }

    pub fn set_bookmark_count(&self, tool_id: i64, count: i32) {
        if let Some(tool) = self.lock().tool_mut(tool_id) {
            tool.bookmark_count = count;
        }
    }

    /// Move a report's `created_at` into the past.
    pub fn backdate_report(&self, id: i64, by: Duration) {
        if let Some(report) = self.lock().reports.iter_mut().find(|r| r.id == id) {
            report.created_at -= by;
        }
    }
}

#[async_trait]
impl ToolRepository for MemoryStore {
    async fn list(
        &self,
        filter: &ToolFilter,
        sort: ToolSort,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)> {
        let state = self.lock();
        let mut tools: Vec<Tool> = state
            .tools
            .iter()
            .filter(|t| matches_filter(&state, t, filter))
            .cloned()
            .collect();
        sort_tools(&mut tools, sort);
        let total = tools.len() as i64;
        Ok((state.details(page.slice(&tools)), total))
    }

    async fn list_admin(
        &self,
        search: Option<&str>,
        include_archived: bool,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)> {
        let state = self.lock();
        let term = search.filter(|s| !s.is_empty()).map(str::to_lowercase);
        let mut tools: Vec<Tool> = state
            .tools
            .iter()
            .filter(|t| include_archived || !t.is_archived())
            .filter(|t| match &term {
                Some(term) => {
                    t.name.to_lowercase().contains(term) || t.slug.to_lowercase().contains(term)
                }
                None => true,
            })
            .cloned()
            .collect();
        tools.sort_by(newest_first);
        let total = tools.len() as i64;
        Ok((state.details(page.slice(&tools)), total))
    }

    async fn list_by_category(
        &self,
        category_id: i64,
        page: Page,
    ) -> DbResult<(Vec<ToolDetail>, i64)> {
        let state = self.lock();
        let mut tools: Vec<Tool> = state
            .tools
            .iter()
            .filter(|t| t.primary_category_id == category_id && !t.is_archived())
            .cloned()
            .collect();
        tools.sort_by_key(|t| t.id);
        let total = tools.len() as i64;
        Ok((state.details(page.slice(&tools)), total))
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Tool>> {
        Ok(self
            .lock()
            .tools
            .iter()
            .find(|t| t.slug == slug && !t.is_archived())
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Tool>> {
        Ok(self.lock().tools.iter().find(|t| t.id == id).cloned())
    }

    async fn load_detail(&self, tool: Tool) -> DbResult<ToolDetail> {
        Ok(self.lock().detail(tool, true))
    }

    async fn alternatives(
        &self,
        tool_id: i64,
        kind: RelationshipType,
        limit: i64,
    ) -> DbResult<Vec<ToolDetail>> {
        let state = self.lock();
        let mut links: Vec<&Alternative> = state
            .alternatives
            .iter()
            .filter(|a| a.tool_id == tool_id && a.kind == kind)
            .collect();
        links.sort_by_key(|a| a.id);
        let tools: Vec<Tool> = links
            .into_iter()
            .filter_map(|a| state.tools.iter().find(|t| t.id == a.alternative_id))
            .filter(|t| !t.is_archived())
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(state.details(tools))
    }

    async fn slug_exists(&self, slug: &str) -> DbResult<bool> {
        Ok(self.lock().tools.iter().any(|t| t.slug == slug))
    }

    async fn create(&self, new: &NewTool) -> DbResult<Tool> {
        let mut state = self.lock();
        let now = Utc::now();
        let tool = Tool {
            id: state.next_id(),
            slug: new.slug.clone(),
            name: new.name.clone(),
            logo_url: new.logo_url.clone(),
            tagline: new.tagline.clone(),
            description: new.description.clone(),
            best_for: new.best_for.clone(),
            primary_use_cases: new.primary_use_cases.clone(),
            pricing_summary: new.pricing_summary.clone(),
            target_roles: new.target_roles.clone(),
            platforms: new.platforms.clone(),
            has_free_tier: new.has_free_tier,
            official_url: new.official_url.clone(),
            primary_category_id: new.primary_category_id,
            avg_rating_overall: 0.0,
            review_count: 0,
            bookmark_count: 0,
            trending_score: 0.0,
            created_at: now,
            updated_at: now,
            archived_at: None,
        };
        state.tools.push(tool.clone());
        Ok(tool)
    }

    async fn update(&self, tool: &Tool) -> DbResult<Tool> {
        let mut state = self.lock();
        let mut updated = tool.clone();
        updated.updated_at = Utc::now();
        if let Some(slot) = state.tool_mut(tool.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn archive(&self, id: i64) -> DbResult<()> {
        if let Some(tool) = self.lock().tool_mut(id) {
            tool.archived_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn adjust_bookmark_count(&self, id: i64, delta: i32) -> DbResult<()> {
        if let Some(tool) = self.lock().tool_mut(id) {
            tool.bookmark_count = (tool.bookmark_count + delta).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> DbResult<Vec<Category>> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by_key(|c| (c.display_order, c.id));
        Ok(categories)
    }

    async fn list_with_counts(&self) -> DbResult<Vec<CategoryWithCount>> {
        let state = self.lock();
        let mut categories = state.categories.clone();
        categories.sort_by_key(|c| (c.display_order, c.id));
        Ok(categories
            .into_iter()
            .map(|category| CategoryWithCount {
                tool_count: state.live_tool_count(category.id),
                category,
            })
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> DbResult<bool> {
        Ok(self.lock().categories.iter().any(|c| c.slug == slug))
    }

    async fn create(&self, new: &NewCategory) -> DbResult<Category> {
        let mut state = self.lock();
        let now = Utc::now();
        let category = Category {
            id: state.next_id(),
            slug: new.slug.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            icon_url: new.icon_url.clone(),
            display_order: new.display_order,
            created_at: now,
            updated_at: now,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, category: &Category) -> DbResult<Category> {
        let mut state = self.lock();
        let mut updated = category.clone();
        updated.updated_at = Utc::now();
        if let Some(slot) = state.categories.iter_mut().find(|c| c.id == category.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let mut state = self.lock();
        if state.tools.iter().any(|t| t.primary_category_id == id) {
            return Err(DatabaseError::Query(format!(
                "category {} is still referenced by tools",
                id
            )));
        }
        state.categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn referencing_tool_count(&self, id: i64) -> DbResult<i64> {
        Ok(self
            .lock()
            .tools
            .iter()
            .filter(|t| t.primary_category_id == id)
            .count() as i64)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn list_with_counts(&self) -> DbResult<Vec<TagWithCount>> {
        let state = self.lock();
        let mut tags = state.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tags
            .into_iter()
            .map(|tag| TagWithCount {
                tool_count: state.tool_tags.iter().filter(|(_, t)| *t == tag.id).count() as i64,
                tag,
            })
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Tag>> {
        Ok(self.lock().tags.iter().find(|t| t.id == id).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> DbResult<bool> {
        Ok(self.lock().tags.iter().any(|t| t.slug == slug))
    }

    async fn create(&self, slug: &str, name: &str) -> DbResult<Tag> {
        Ok(self.seed_tag(slug, name))
    }

    async fn update(&self, tag: &Tag) -> DbResult<Tag> {
        let mut state = self.lock();
        if let Some(slot) = state.tags.iter_mut().find(|t| t.id == tag.id) {
            *slot = tag.clone();
        }
        Ok(tag.clone())
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let mut state = self.lock();
        state.tool_tags.retain(|(_, tag_id)| *tag_id != id);
        state.tags.retain(|t| t.id != id);
        Ok(())
    }
}

#[async_trait]
impl BadgeRepository for MemoryStore {
    async fn list(&self) -> DbResult<Vec<Badge>> {
        let mut badges = self.lock().badges.clone();
        badges.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(badges)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Badge>> {
        Ok(self.lock().badges.iter().find(|b| b.id == id).cloned())
    }

    async fn list_for_tool(&self, tool_id: i64) -> DbResult<Vec<Badge>> {
        let state = self.lock();
        Ok(state
            .tool_badges
            .iter()
            .filter(|(t, _)| *t == tool_id)
            .filter_map(|(_, badge_id)| state.badges.iter().find(|b| b.id == *badge_id).cloned())
            .collect())
    }

    async fn is_assigned(&self, tool_id: i64, badge_id: i64) -> DbResult<bool> {
        Ok(self.lock().tool_badges.contains(&(tool_id, badge_id)))
    }

    async fn assign(&self, tool_id: i64, badge_id: i64) -> DbResult<()> {
        self.lock().tool_badges.push((tool_id, badge_id));
        Ok(())
    }

    async fn unassign(&self, tool_id: i64, badge_id: i64) -> DbResult<()> {
        self.lock()
            .tool_badges
            .retain(|pair| *pair != (tool_id, badge_id));
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn list_approved(
        &self,
        tool_id: i64,
        sort: ReviewSort,
        page: Page,
    ) -> DbResult<(Vec<Review>, i64)> {
        let state = self.lock();
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.tool_id == tool_id && r.moderation_status == ModerationStatus::Approved)
            .map(|r| state.joined(r))
            .collect();
        reviews.sort_by(|a, b| {
            let primary = match sort {
                ReviewSort::Newest => Ordering::Equal,
                ReviewSort::MostHelpful => b.helpful_count.cmp(&a.helpful_count),
                ReviewSort::Highest => b.rating_overall.cmp(&a.rating_overall),
                ReviewSort::Lowest => a.rating_overall.cmp(&b.rating_overall),
            };
            primary.then_with(|| newest_review_first(a, b))
        });
        let total = reviews.len() as i64;
        Ok((page.slice(&reviews), total))
    }

    async fn list_by_user(&self, user_id: i64, page: Page) -> DbResult<(Vec<Review>, i64)> {
        let state = self.lock();
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| state.joined(r))
            .collect();
        reviews.sort_by(newest_review_first);
        let total = reviews.len() as i64;
        Ok((page.slice(&reviews), total))
    }

    async fn has_reviewed(&self, tool_id: i64, user_id: i64) -> DbResult<bool> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .any(|r| r.tool_id == tool_id && r.user_id == user_id))
    }

    async fn create(&self, new: &NewReview) -> DbResult<Review> {
        let mut state = self.lock();
        let now = Utc::now();
        let review = Review {
            id: state.next_id(),
            tool_id: new.tool_id,
            user_id: new.user_id,
            rating_overall: new.rating_overall,
            rating_ease_of_use: new.rating_ease_of_use,
            rating_value: new.rating_value,
            rating_accuracy: new.rating_accuracy,
            rating_speed: new.rating_speed,
            rating_support: new.rating_support,
            pros: new.pros.clone(),
            cons: new.cons.clone(),
            primary_use_case: new.primary_use_case.clone(),
            reviewer_role: new.reviewer_role.clone(),
            company_size: new.company_size.clone(),
            usage_context: new.usage_context.clone(),
            helpful_count: 0,
            moderation_status: new.moderation_status,
            moderated_by: None,
            moderated_at: None,
            created_at: now,
            updated_at: now,
            user_display_name: String::new(),
            tool_slug: String::new(),
            tool_name: String::new(),
            tool_logo_url: None,
        };
        let review = state.joined(&review);
        state.reviews.push(review.clone());
        Ok(review)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Review>> {
        let state = self.lock();
        Ok(state
            .reviews
            .iter()
            .find(|r| r.id == id)
            .map(|r| state.joined(r)))
    }

    async fn set_status(
        &self,
        id: i64,
        status: ModerationStatus,
        moderator_id: i64,
    ) -> DbResult<()> {
        if let Some(review) = self.lock().reviews.iter_mut().find(|r| r.id == id) {
            let now = Utc::now();
            review.moderation_status = status;
            review.moderated_by = Some(moderator_id);
            review.moderated_at = Some(now);
            review.updated_at = now;
        }
        Ok(())
    }

    async fn refresh_tool_rating(&self, tool_id: i64) -> DbResult<()> {
        let mut state = self.lock();
        let ratings: Vec<i32> = state
            .reviews
            .iter()
            .filter(|r| r.tool_id == tool_id && r.moderation_status == ModerationStatus::Approved)
            .map(|r| r.rating_overall)
            .collect();
        let count = ratings.len() as i32;
        let avg = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64
        };
        if let Some(tool) = state.tool_mut(tool_id) {
            tool.avg_rating_overall = avg;
            tool.review_count = count;
        }
        Ok(())
    }
}

fn owned_by(row: &BookmarkRow, owner: &BookmarkOwner) -> bool {
    match owner {
        BookmarkOwner::User(id) => row.user_id == Some(*id),
        BookmarkOwner::Session(session) => row.session_id.as_deref() == Some(session.as_str()),
    }
}

#[async_trait]
impl BookmarkRepository for MemoryStore {
    async fn list_tools(&self, owner: &BookmarkOwner) -> DbResult<Vec<ToolDetail>> {
        let state = self.lock();
        let mut rows: Vec<&BookmarkRow> =
            state.bookmarks.iter().filter(|b| owned_by(b, owner)).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let tools: Vec<Tool> = rows
            .into_iter()
            .filter_map(|row| state.tools.iter().find(|t| t.id == row.tool_id).cloned())
            .collect();
        Ok(state.details(tools))
    }

    async fn find(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<Option<BookmarkRow>> {
        Ok(self
            .lock()
            .bookmarks
            .iter()
            .find(|b| b.tool_id == tool_id && owned_by(b, owner))
            .cloned())
    }

    async fn create(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<BookmarkRow> {
        let mut state = self.lock();
        let row = BookmarkRow {
            id: state.next_id(),
            user_id: owner.user_id(),
            session_id: owner.session_id().map(str::to_string),
            tool_id,
            created_at: Utc::now(),
        };
        state.bookmarks.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, owner: &BookmarkOwner, tool_id: i64) -> DbResult<bool> {
        let mut state = self.lock();
        let before = state.bookmarks.len();
        state
            .bookmarks
            .retain(|b| !(b.tool_id == tool_id && owned_by(b, owner)));
        Ok(state.bookmarks.len() < before)
    }

    async fn migrate_session(&self, user_id: i64, session_id: &str) -> DbResult<u64> {
        let mut state = self.lock();
        let owned: Vec<i64> = state
            .bookmarks
            .iter()
            .filter(|b| b.user_id == Some(user_id))
            .map(|b| b.tool_id)
            .collect();
        let mut moved = 0;
        for row in state.bookmarks.iter_mut() {
            if row.session_id.as_deref() == Some(session_id) && !owned.contains(&row.tool_id) {
                row.user_id = Some(user_id);
                row.session_id = None;
                moved += 1;
            }
        }
        Ok(moved)
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn create(&self, new: &NewReport) -> DbResult<Report> {
        let mut state = self.lock();
        let report = Report {
            id: state.next_id(),
            target: new.target,
            reporter_user_id: new.reporter_user_id,
            reason: new.reason,
            comment: new.comment.clone(),
            status: ReportStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };
        state.reports.push(report.clone());
        Ok(report)
    }

    async fn count_since(
        &self,
        reporter_id: i64,
        target: ReportTarget,
        since: DateTime<Utc>,
    ) -> DbResult<i64> {
        Ok(self
            .lock()
            .reports
            .iter()
            .filter(|r| {
                r.reporter_user_id == Some(reporter_id) && r.target == target && r.created_at >= since
            })
            .count() as i64)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Report>> {
        Ok(self.lock().reports.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, filter: ReportFilter, page: Page) -> DbResult<(Vec<Report>, i64)> {
        let mut reports: Vec<Report> = self
            .lock()
            .reports
            .iter()
            .filter(|r| filter.kind.map_or(true, |k| r.target.kind() == k))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = reports.len() as i64;
        Ok((page.slice(&reports), total))
    }

    async fn set_status(&self, id: i64, status: ReportStatus, reviewed_by: i64) -> DbResult<()> {
        if let Some(report) = self.lock().reports.iter_mut().find(|r| r.id == id) {
            report.status = status;
            report.reviewed_by = Some(reviewed_by);
            report.reviewed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn record_action(
        &self,
        review_id: i64,
        moderator_id: i64,
        action: ModerationActionType,
        notes: Option<&str>,
    ) -> DbResult<()> {
        let mut state = self.lock();
        let entry = ModerationAction {
            id: state.next_id(),
            review_id,
            moderator_id,
            action_type: action,
            notes: notes.map(str::to_string),
            created_at: Utc::now(),
            moderator_display_name: state.display_name(moderator_id),
        };
        state.actions.push(entry);
        Ok(())
    }

    async fn history(&self, review_id: i64) -> DbResult<Vec<ModerationAction>> {
        let mut actions: Vec<ModerationAction> = self
            .lock()
            .actions
            .iter()
            .filter(|a| a.review_id == review_id)
            .cloned()
            .collect();
        actions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(actions)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn email_exists(&self, email: &str) -> DbResult<bool> {
        Ok(self.lock().users.iter().any(|u| u.email == email))
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
        role: UserRole,
    ) -> DbResult<User> {
        let mut user = self.seed_user_with_role(email, display_name, role);
        user.password_hash = password_hash.to_string();
        if let Some(slot) = self.lock().users.iter_mut().find(|u| u.id == user.id) {
            slot.password_hash = user.password_hash.clone();
        }
        Ok(user)
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryStore {
    async fn overview(
        &self,
        week_ago: DateTime<Utc>,
        month_ago: DateTime<Utc>,
    ) -> DbResult<OverviewStats> {
        let state = self.lock();
        let live = || state.tools.iter().filter(|t| !t.is_archived());
        Ok(OverviewStats {
            total_tools: live().count() as i64,
            total_categories: state.categories.len() as i64,
            total_reviews: state.reviews.len() as i64,
            total_bookmarks: state.bookmarks.len() as i64,
            total_users: state.users.len() as i64,
            new_tools_week: live().filter(|t| t.created_at >= week_ago).count() as i64,
            new_tools_month: live().filter(|t| t.created_at >= month_ago).count() as i64,
            new_reviews_week: state
                .reviews
                .iter()
                .filter(|r| r.created_at >= week_ago)
                .count() as i64,
            new_users_week: state
                .users
                .iter()
                .filter(|u| u.created_at >= week_ago)
                .count() as i64,
        })
    }

    async fn top_tools(&self, order: TopToolOrder, limit: i64) -> DbResult<Vec<TopTool>> {
        let state = self.lock();
        let mut tools: Vec<&Tool> = state
            .tools
            .iter()
            .filter(|t| !t.is_archived())
            .filter(|t| order != TopToolOrder::Rating || t.review_count >= 1)
            .collect();
        tools.sort_by(|a, b| {
            let primary = match order {
                TopToolOrder::Bookmarks => b.bookmark_count.cmp(&a.bookmark_count),
                TopToolOrder::Rating => desc_f64(a.avg_rating_overall, b.avg_rating_overall)
                    .then(b.review_count.cmp(&a.review_count)),
                TopToolOrder::Reviews => b.review_count.cmp(&a.review_count),
            };
            primary.then(a.id.cmp(&b.id))
        });
        Ok(tools
            .into_iter()
            .take(limit as usize)
            .map(|t| TopTool {
                id: t.id,
                slug: t.slug.clone(),
                name: t.name.clone(),
                logo_url: t.logo_url.clone(),
                bookmark_count: t.bookmark_count,
                review_count: t.review_count,
                avg_rating: t.avg_rating_overall,
            })
            .collect())
    }

    async fn top_categories(&self, limit: i64) -> DbResult<Vec<TopCategory>> {
        let state = self.lock();
        let mut categories: Vec<TopCategory> = state
            .categories
            .iter()
            .map(|c| TopCategory {
                id: c.id,
                slug: c.slug.clone(),
                name: c.name.clone(),
                tool_count: state.live_tool_count(c.id),
            })
            .collect();
        categories.sort_by(|a, b| b.tool_count.cmp(&a.tool_count).then(a.id.cmp(&b.id)));
        categories.truncate(limit.max(0) as usize);
        Ok(categories)
    }
}
