/// Privacy/visibility evaluation collaborator
///
/// Share and comment preconditions consult this seam; the default
/// implementation resolves CONNECTIONS privacy through the profile
/// connection edges in the content store. A deployment may substitute a
/// richer evaluator (blocks, mutes) behind the same trait.
use crate::domain::{ContentItem, Privacy};
use crate::error::Result;
use crate::repository::ContentRepository;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait VisibilityEvaluator: Send + Sync {
    /// Whether the viewer may see the given content item
    async fn can_view(&self, viewer_id: Uuid, content: &ContentItem) -> Result<bool>;
}

/// Default evaluator over the content store's connection edges
pub struct PrivacyGate {
    repo: Arc<dyn ContentRepository>,
}

impl PrivacyGate {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl VisibilityEvaluator for PrivacyGate {
    async fn can_view(&self, viewer_id: Uuid, content: &ContentItem) -> Result<bool> {
        let author_id = content.main_author_id();
        if viewer_id == author_id {
            return Ok(true);
        }
        match content.privacy() {
            Privacy::Public => Ok(true),
            Privacy::Private => Ok(false),
            Privacy::Connections => self.repo.are_connected(viewer_id, author_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Post, Profile};
    use crate::repository::MemoryContentRepository;

    #[tokio::test]
    async fn connections_privacy_follows_the_edge_set() {
        let repo = Arc::new(MemoryContentRepository::new());
        let gate = PrivacyGate::new(repo.clone());

        let alice = Profile::new("alice", "Alice", None);
        let bob = Profile::new("bob", "Bob", None);
        let dave = Profile::new("dave", "Dave", None);
        repo.insert_profile(&alice).await.unwrap();
        repo.insert_profile(&bob).await.unwrap();
        repo.insert_profile(&dave).await.unwrap();
        repo.add_connection(alice.id, bob.id).await.unwrap();

        let post = ContentItem::Post(Post::new(alice.id, "hello", Privacy::Connections));
        assert!(gate.can_view(alice.id, &post).await.unwrap());
        assert!(gate.can_view(bob.id, &post).await.unwrap());
        assert!(!gate.can_view(dave.id, &post).await.unwrap());
    }

    #[tokio::test]
    async fn private_content_is_author_only() {
        let repo = Arc::new(MemoryContentRepository::new());
        let gate = PrivacyGate::new(repo.clone());

        let alice = Profile::new("alice", "Alice", None);
        let bob = Profile::new("bob", "Bob", None);
        repo.add_connection(alice.id, bob.id).await.unwrap();

        let post = ContentItem::Post(Post::new(alice.id, "just for me", Privacy::Private));
        assert!(gate.can_view(alice.id, &post).await.unwrap());
        assert!(!gate.can_view(bob.id, &post).await.unwrap());
    }
}
