/// Profile service - identity creation, lookup and connection management
use crate::domain::Profile;
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use std::sync::Arc;

pub struct ProfileService {
    repo: Arc<dyn ContentRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Create a profile with a unique username
    pub async fn create_profile(
        &self,
        username: &str,
        display_name: &str,
        bio: Option<&str>,
    ) -> Result<Profile> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("username must not be empty".into()));
        }
        if self.repo.get_profile(username).await?.is_some() {
            return Err(AppError::Validation(format!(
                "username {username} is already taken"
            )));
        }

        let profile = Profile::new(username, display_name, bio);
        self.repo.insert_profile(&profile).await?;

        tracing::info!(username, profile_id = %profile.id, "profile created");
        Ok(profile)
    }

    /// Look up a profile by username
    pub async fn get_profile(&self, username: &str) -> Result<Profile> {
        self.repo
            .get_profile(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {username}")))
    }

    /// Record a symmetric connection between two profiles
    pub async fn connect(&self, username_a: &str, username_b: &str) -> Result<()> {
        let a = self.get_profile(username_a).await?;
        let b = self.get_profile(username_b).await?;
        if a.id == b.id {
            return Err(AppError::Validation(
                "a profile cannot connect to itself".into(),
            ));
        }
        self.repo.add_connection(a.id, b.id).await?;

        tracing::info!(a = username_a, b = username_b, "profiles connected");
        Ok(())
    }

    /// Delete a profile and cascade the content it authored. Shares of its
    /// posts held by other profiles survive with the source-removed marker.
    pub async fn delete_profile(&self, username: &str) -> Result<()> {
        let profile = self.get_profile(username).await?;
        self.repo.delete_profile(profile.id).await?;

        tracing::info!(username, "profile deleted");
        Ok(())
    }
}
