/// Reaction service - sentiment aggregation on reaction-capable content
///
/// At most one reaction per reactor per content item; a repeat from the
/// same reactor overwrites the kind and is never an error. The uniqueness
/// invariant is enforced by the store, not by callers.
use crate::domain::{Reaction, ReactionKind};
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use crate::services::resolve_reactable;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct ReactionService {
    repo: Arc<dyn ContentRepository>,
}

impl ReactionService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Insert the reactor's reaction, or overwrite its kind if one exists
    pub async fn add_or_update_reaction(
        &self,
        content_id: Uuid,
        reactor_username: &str,
        kind: ReactionKind,
    ) -> Result<Reaction> {
        let reactor = self
            .repo
            .get_profile(reactor_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {reactor_username}")))?;
        resolve_reactable(self.repo.as_ref(), content_id).await?;

        let (reaction, was_created) = self
            .repo
            .upsert_reaction(content_id, reactor.id, kind)
            .await?;

        if was_created {
            tracing::info!(%content_id, reactor = reactor_username, kind = kind.as_str(), "reaction added");
        } else {
            tracing::debug!(%content_id, reactor = reactor_username, kind = kind.as_str(), "reaction replaced");
        }
        Ok(reaction)
    }

    /// Remove the reactor's reaction; Ok(false) when there was none
    pub async fn remove_reaction(
        &self,
        content_id: Uuid,
        reactor_username: &str,
    ) -> Result<bool> {
        let reactor = self
            .repo
            .get_profile(reactor_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {reactor_username}")))?;

        let removed = self.repo.remove_reaction(content_id, reactor.id).await?;
        if !removed {
            tracing::debug!(%content_id, reactor = reactor_username, "no reaction to remove");
        }
        Ok(removed)
    }

    /// Aggregate reaction counts per kind for a content item
    pub async fn reaction_counts(&self, content_id: Uuid) -> Result<HashMap<ReactionKind, i64>> {
        resolve_reactable(self.repo.as_ref(), content_id).await?;
        self.repo.reaction_counts(content_id).await
    }

    /// Reactions on a content item, newest first
    pub async fn get_reactions(
        &self,
        content_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reaction>> {
        resolve_reactable(self.repo.as_ref(), content_id).await?;
        self.repo.get_reactions(content_id, limit, offset).await
    }
}
