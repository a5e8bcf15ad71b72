/// Content service - polymorphic lookup and author resolution
///
/// Feed assembly and notification dispatch resolve any content ID through
/// this single contract without inspecting the concrete variant.
use crate::domain::{ContentItem, Profile};
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use std::sync::Arc;
use uuid::Uuid;

pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Resolve any content ID to its variant
    pub async fn get_content(&self, content_id: Uuid) -> Result<ContentItem> {
        self.repo
            .get_content(content_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("content {content_id}")))
    }

    /// Resolve the profile a content item is attributed to: a post's author,
    /// a share's sharer, a comment's commentor
    pub async fn main_author(&self, content_id: Uuid) -> Result<Profile> {
        let content = self.get_content(content_id).await?;
        let author_id = content.main_author_id();
        self.repo
            .get_profile_by_id(author_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {author_id}")))
    }
}
