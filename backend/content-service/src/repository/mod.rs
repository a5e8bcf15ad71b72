/// Persistence collaborator for the content subsystem
///
/// The domain issues logical operations against this trait; atomicity of
/// multi-row operations is the implementor's responsibility (a transaction
/// in Postgres, a single writer lock in memory). Entities reference each
/// other by ID, so the store doubles as the lookup index keyed by content ID.
use crate::domain::{
    Comment, ContentItem, Post, Profile, ReactableItem, Reaction, ReactionKind, SharedPost,
};
use crate::error::Result;
use std::collections::HashMap;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::MemoryContentRepository;
pub use postgres::PgContentRepository;

#[async_trait::async_trait]
pub trait ContentRepository: Send + Sync {
    // --- profiles ---

    /// Insert a new profile; the username must not be taken
    async fn insert_profile(&self, profile: &Profile) -> Result<()>;

    /// Look up a profile by its unique username
    async fn get_profile(&self, username: &str) -> Result<Option<Profile>>;

    /// Look up a profile by internal ID
    async fn get_profile_by_id(&self, id: Uuid) -> Result<Option<Profile>>;

    /// Delete a profile and cascade the content it authored; shares of its
    /// posts held by other profiles are orphan-marked, not deleted
    async fn delete_profile(&self, id: Uuid) -> Result<bool>;

    /// Record a symmetric connection between two profiles
    async fn add_connection(&self, a: Uuid, b: Uuid) -> Result<()>;

    /// Check whether two profiles are connected (symmetric)
    async fn are_connected(&self, a: Uuid, b: Uuid) -> Result<bool>;

    // --- polymorphic content lookup ---

    /// Resolve any content ID to its variant
    async fn get_content(&self, content_id: Uuid) -> Result<Option<ContentItem>>;

    /// Resolve a content ID to its reaction-capable variant; `None` for
    /// shared posts and unknown IDs alike
    async fn get_reactable(&self, content_id: Uuid) -> Result<Option<ReactableItem>>;

    // --- posts ---

    async fn insert_post(&self, post: &Post) -> Result<()>;

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Posts authored by a profile, newest first
    async fn get_profile_posts(&self, author_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Post>>;

    /// Delete a post, its comments and reactions, and orphan-mark every
    /// share referencing it, atomically
    async fn delete_post(&self, post_id: Uuid) -> Result<bool>;

    // --- shared posts ---

    async fn insert_shared_post(&self, share: &SharedPost) -> Result<()>;

    async fn get_shared_post(&self, share_id: Uuid) -> Result<Option<SharedPost>>;

    /// Shares referencing a post, newest first
    async fn get_post_shares(&self, post_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<SharedPost>>;

    /// Shares authored by a profile, newest first
    async fn get_profile_shares(
        &self,
        sharer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SharedPost>>;

    /// Delete a share; never touches the underlying post
    async fn delete_shared_post(&self, share_id: Uuid) -> Result<bool>;

    // --- comments ---

    async fn insert_comment(&self, comment: &Comment) -> Result<()>;

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    /// Comments attached to a target, oldest first
    async fn get_comments(&self, target_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Comment>>;

    async fn count_comments(&self, target_id: Uuid) -> Result<i64>;

    /// Delete a comment and its reactions; replies keep their rows
    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool>;

    // --- reactions ---

    /// Insert or overwrite the reactor's reaction on a content item.
    /// Returns (reaction, was_created); was_created is false on overwrite.
    async fn upsert_reaction(
        &self,
        content_id: Uuid,
        reactor_id: Uuid,
        kind: ReactionKind,
    ) -> Result<(Reaction, bool)>;

    /// Remove the reactor's reaction; Ok(false) if there was none
    async fn remove_reaction(&self, content_id: Uuid, reactor_id: Uuid) -> Result<bool>;

    async fn get_reaction(&self, content_id: Uuid, reactor_id: Uuid) -> Result<Option<Reaction>>;

    /// Reactions on a content item, newest first
    async fn get_reactions(
        &self,
        content_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reaction>>;

    /// Aggregate reaction counts per kind
    async fn reaction_counts(&self, content_id: Uuid) -> Result<HashMap<ReactionKind, i64>>;
}
