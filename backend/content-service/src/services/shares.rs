/// Share service - re-publication of existing posts
///
/// A share is the sharer's own content with its own privacy; it references
/// the original post and never owns it. Re-sharing the same post again
/// creates a new record: share history is kept, not deduplicated.
use crate::domain::{ContentItem, Privacy, SharedPost};
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use crate::visibility::VisibilityEvaluator;
use std::sync::Arc;
use uuid::Uuid;

pub struct ShareService {
    repo: Arc<dyn ContentRepository>,
    gate: Arc<dyn VisibilityEvaluator>,
}

impl ShareService {
    pub fn new(repo: Arc<dyn ContentRepository>, gate: Arc<dyn VisibilityEvaluator>) -> Self {
        Self { repo, gate }
    }

    /// Share an existing post under the sharer's own privacy setting. The
    /// original must be visible to the sharer.
    pub async fn create_share(
        &self,
        sharer_username: &str,
        post_id: Uuid,
        privacy: Privacy,
    ) -> Result<SharedPost> {
        let sharer = self
            .repo
            .get_profile(sharer_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {sharer_username}")))?;
        let post = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

        if !self
            .gate
            .can_view(sharer.id, &ContentItem::Post(post.clone()))
            .await?
        {
            return Err(AppError::Forbidden(format!(
                "post {post_id} is not visible to {sharer_username}"
            )));
        }

        let share = SharedPost::new(sharer.id, post.id, privacy);
        self.repo.insert_shared_post(&share).await?;

        tracing::info!(share_id = %share.id, %post_id, sharer = sharer_username, "post shared");
        Ok(share)
    }

    /// Get a share by ID
    pub async fn get_share(&self, share_id: Uuid) -> Result<SharedPost> {
        self.repo
            .get_shared_post(share_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("shared post {share_id}")))
    }

    /// Shares referencing a post, newest first
    pub async fn get_post_shares(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SharedPost>> {
        self.repo.get_post_shares(post_id, limit, offset).await
    }

    /// Shares authored by a profile, newest first
    pub async fn get_profile_shares(
        &self,
        username: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SharedPost>> {
        let sharer = self
            .repo
            .get_profile(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {username}")))?;
        self.repo.get_profile_shares(sharer.id, limit, offset).await
    }

    /// Delete a share; only the sharer may do so, and the underlying post is
    /// never touched
    pub async fn delete_share(&self, share_id: Uuid, username: &str) -> Result<()> {
        let caller = self
            .repo
            .get_profile(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {username}")))?;
        let share = self.get_share(share_id).await?;
        if share.sharer_id != caller.id {
            return Err(AppError::Forbidden(format!(
                "{username} is not the sharer of {share_id}"
            )));
        }

        self.repo.delete_shared_post(share_id).await?;

        tracing::info!(%share_id, sharer = username, "shared post deleted");
        Ok(())
    }
}
