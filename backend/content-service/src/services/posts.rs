/// Post service - handles post creation, retrieval and deletion
use crate::domain::{Post, Privacy};
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use std::sync::Arc;
use uuid::Uuid;

pub struct PostService {
    repo: Arc<dyn ContentRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Create a new post authored by the given profile
    pub async fn create_post(
        &self,
        author_username: &str,
        body: &str,
        privacy: Privacy,
    ) -> Result<Post> {
        if body.trim().is_empty() {
            return Err(AppError::Validation("post body must not be empty".into()));
        }
        let author = self
            .repo
            .get_profile(author_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {author_username}")))?;

        let post = Post::new(author.id, body, privacy);
        self.repo.insert_post(&post).await?;

        tracing::info!(post_id = %post.id, author = author_username, "post created");
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.repo
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))
    }

    /// Posts authored by a profile, newest first
    pub async fn get_profile_posts(
        &self,
        username: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let author = self
            .repo
            .get_profile(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {username}")))?;
        self.repo.get_profile_posts(author.id, limit, offset).await
    }

    /// Delete a post; only its author may do so. The post's comments and
    /// reactions go with it, shares of it are retained with the
    /// source-removed marker.
    pub async fn delete_post(&self, post_id: Uuid, username: &str) -> Result<()> {
        let caller = self
            .repo
            .get_profile(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {username}")))?;
        let post = self.get_post(post_id).await?;
        if post.author_id != caller.id {
            return Err(AppError::Forbidden(format!(
                "{username} is not the author of post {post_id}"
            )));
        }

        self.repo.delete_post(post_id).await?;

        tracing::info!(%post_id, author = username, "post deleted");
        Ok(())
    }
}
