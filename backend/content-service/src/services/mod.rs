/// Business logic layer, one service per concern
///
/// Services hold the repository and visibility collaborators behind their
/// trait seams and enforce the operation preconditions; they never retry and
/// never swallow a failure.
use crate::domain::ReactableItem;
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use uuid::Uuid;

pub mod comments;
pub mod content;
pub mod posts;
pub mod profiles;
pub mod reactions;
pub mod shares;

pub use comments::{CommentService, MAX_THREAD_DEPTH};
pub use content::ContentService;
pub use posts::PostService;
pub use profiles::ProfileService;
pub use reactions::ReactionService;
pub use shares::ShareService;

/// Resolve a content ID to its reaction-capable variant. A shared post is a
/// validation failure (it exists but does not accept comments or reactions);
/// anything else unresolved is not found.
pub(crate) async fn resolve_reactable(
    repo: &dyn ContentRepository,
    content_id: Uuid,
) -> Result<ReactableItem> {
    if let Some(target) = repo.get_reactable(content_id).await? {
        return Ok(target);
    }
    if repo.get_content(content_id).await?.is_some() {
        return Err(AppError::Validation(format!(
            "content {content_id} does not accept comments or reactions"
        )));
    }
    Err(AppError::NotFound(format!("content {content_id}")))
}
