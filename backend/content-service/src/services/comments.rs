/// Comment service - annotations on any reaction-capable content
///
/// Commenting on a post and replying to a comment go through the same code
/// path; the target is resolved polymorphically. Deleting a comment removes
/// it from its target's collection without cascading into replies, which
/// become unreachable through target resolution.
use crate::domain::{Comment, ReactableItem};
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use crate::services::resolve_reactable;
use crate::visibility::VisibilityEvaluator;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum reply nesting below a post. Targets are immutable after
/// creation, so the depth walk also rules out cycles.
pub const MAX_THREAD_DEPTH: usize = 8;

pub struct CommentService {
    repo: Arc<dyn ContentRepository>,
    gate: Arc<dyn VisibilityEvaluator>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn ContentRepository>, gate: Arc<dyn VisibilityEvaluator>) -> Self {
        Self { repo, gate }
    }

    /// Attach a comment to any reaction-capable target
    pub async fn add_comment(
        &self,
        target_id: Uuid,
        commentor_username: &str,
        text: &str,
    ) -> Result<Comment> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("comment text must not be empty".into()));
        }
        let commentor = self
            .repo
            .get_profile(commentor_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {commentor_username}")))?;

        let target = resolve_reactable(self.repo.as_ref(), target_id).await?;
        let target_privacy = target.privacy();

        if !self
            .gate
            .can_view(commentor.id, &target.clone().into_content_item())
            .await?
        {
            return Err(AppError::Forbidden(format!(
                "content {target_id} is not visible to {commentor_username}"
            )));
        }

        if self.thread_depth(&target).await? >= MAX_THREAD_DEPTH {
            return Err(AppError::Validation(format!(
                "reply thread exceeds the maximum depth of {MAX_THREAD_DEPTH}"
            )));
        }

        let comment = Comment::new(commentor.id, target_id, text, target_privacy);
        self.repo.insert_comment(&comment).await?;

        tracing::info!(
            comment_id = %comment.id,
            %target_id,
            commentor = commentor_username,
            "comment added"
        );
        Ok(comment)
    }

    /// Comments attached to a target, oldest first. A deleted or unknown
    /// target is not found; replies under a deleted parent are unreachable
    /// by design.
    pub async fn get_comments(
        &self,
        target_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>> {
        resolve_reactable(self.repo.as_ref(), target_id).await?;
        self.repo.get_comments(target_id, limit, offset).await
    }

    /// Count comments attached to a target
    pub async fn count_comments(&self, target_id: Uuid) -> Result<i64> {
        resolve_reactable(self.repo.as_ref(), target_id).await?;
        self.repo.count_comments(target_id).await
    }

    /// Delete a comment; only its commentor may do so. Reactions on the
    /// comment go with it; replies keep their rows.
    pub async fn delete_comment(&self, comment_id: Uuid, username: &str) -> Result<()> {
        let caller = self
            .repo
            .get_profile(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {username}")))?;
        let comment = self
            .repo
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;
        if comment.commentor_id != caller.id {
            return Err(AppError::Forbidden(format!(
                "{username} is not the commentor of {comment_id}"
            )));
        }

        self.repo.delete_comment(comment_id).await?;

        tracing::info!(%comment_id, commentor = username, "comment deleted");
        Ok(())
    }

    /// Depth of the target within its thread: 0 for a post, 1 for a comment
    /// on a post, and so on. A missing ancestor ends the walk early.
    async fn thread_depth(&self, target: &ReactableItem) -> Result<usize> {
        let mut depth = 0;
        let mut current = target.clone();
        while let ReactableItem::Comment(comment) = current {
            depth += 1;
            if depth > MAX_THREAD_DEPTH {
                break;
            }
            match self.repo.get_reactable(comment.target_id).await? {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Ok(depth)
    }
}
