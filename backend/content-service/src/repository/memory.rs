/// In-memory repository: an ID-keyed arena with the same contract as the
/// Postgres store
///
/// Entities live in per-variant maps keyed by content ID, so polymorphic
/// lookup is an index probe rather than an object graph walk. One writer
/// lock per logical operation stands in for the database transaction; no
/// partial write is ever observable. Used as the test double and for
/// single-process deployments.
use crate::domain::{
    Comment, ContentItem, Post, Profile, ReactableItem, Reaction, ReactionKind, SharedPost,
};
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct State {
    profiles: HashMap<Uuid, Profile>,
    usernames: HashMap<String, Uuid>,
    posts: HashMap<Uuid, Post>,
    shared_posts: HashMap<Uuid, SharedPost>,
    comments: HashMap<Uuid, Comment>,
    /// Ordered per content item; at most one entry per reactor
    reactions: HashMap<Uuid, Vec<Reaction>>,
    /// Normalized (low, high) pairs
    connections: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
pub struct MemoryContentRepository {
    state: RwLock<State>,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| AppError::Storage("content store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| AppError::Storage("content store lock poisoned".to_string()))
    }
}

fn normalized(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn page<T: Clone>(mut items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = offset.max(0) as usize;
    let limit = limit.max(0) as usize;
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(limit);
    items
}

#[async_trait::async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let mut state = self.write()?;
        if state.usernames.contains_key(&profile.username) {
            return Err(AppError::Storage(format!(
                "unique constraint violated: username {}",
                profile.username
            )));
        }
        state.usernames.insert(profile.username.clone(), profile.id);
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn get_profile(&self, username: &str) -> Result<Option<Profile>> {
        let state = self.read()?;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.profiles.get(id))
            .cloned())
    }

    async fn get_profile_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.read()?.profiles.get(&id).cloned())
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool> {
        let mut state = self.write()?;
        let profile = match state.profiles.remove(&id) {
            Some(profile) => profile,
            None => return Ok(false),
        };
        state.usernames.remove(&profile.username);

        for reactions in state.reactions.values_mut() {
            reactions.retain(|r| r.reactor_id != id);
        }

        let post_ids: Vec<Uuid> = state
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        let comment_ids: Vec<Uuid> = state
            .comments
            .values()
            .filter(|c| c.commentor_id == id || post_ids.contains(&c.target_id))
            .map(|c| c.id)
            .collect();

        for comment_id in &comment_ids {
            state.comments.remove(comment_id);
            state.reactions.remove(comment_id);
        }
        for post_id in &post_ids {
            state.posts.remove(post_id);
            state.reactions.remove(post_id);
        }
        state.shared_posts.retain(|_, s| s.sharer_id != id);
        for share in state.shared_posts.values_mut() {
            if post_ids.contains(&share.post_id) {
                share.source_removed = true;
            }
        }
        state.connections.retain(|(a, b)| *a != id && *b != id);

        Ok(true)
    }

    async fn add_connection(&self, a: Uuid, b: Uuid) -> Result<()> {
        self.write()?.connections.insert(normalized(a, b));
        Ok(())
    }

    async fn are_connected(&self, a: Uuid, b: Uuid) -> Result<bool> {
        Ok(self.read()?.connections.contains(&normalized(a, b)))
    }

    async fn get_content(&self, content_id: Uuid) -> Result<Option<ContentItem>> {
        let state = self.read()?;
        if let Some(post) = state.posts.get(&content_id) {
            return Ok(Some(ContentItem::Post(post.clone())));
        }
        if let Some(share) = state.shared_posts.get(&content_id) {
            return Ok(Some(ContentItem::SharedPost(share.clone())));
        }
        if let Some(comment) = state.comments.get(&content_id) {
            return Ok(Some(ContentItem::Comment(comment.clone())));
        }
        Ok(None)
    }

    async fn get_reactable(&self, content_id: Uuid) -> Result<Option<ReactableItem>> {
        let state = self.read()?;
        if let Some(post) = state.posts.get(&content_id) {
            return Ok(Some(ReactableItem::Post(post.clone())));
        }
        if let Some(comment) = state.comments.get(&content_id) {
            return Ok(Some(ReactableItem::Comment(comment.clone())));
        }
        Ok(None)
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.write()?.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.read()?.posts.get(&post_id).cloned())
    }

    async fn get_profile_posts(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let state = self.read()?;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(posts, limit, offset))
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut state = self.write()?;
        if state.posts.remove(&post_id).is_none() {
            return Ok(false);
        }
        state.reactions.remove(&post_id);

        let owned_comments: Vec<Uuid> = state
            .comments
            .values()
            .filter(|c| c.target_id == post_id)
            .map(|c| c.id)
            .collect();
        for comment_id in owned_comments {
            state.comments.remove(&comment_id);
            state.reactions.remove(&comment_id);
        }

        for share in state.shared_posts.values_mut() {
            if share.post_id == post_id {
                share.source_removed = true;
            }
        }

        Ok(true)
    }

    async fn insert_shared_post(&self, share: &SharedPost) -> Result<()> {
        self.write()?.shared_posts.insert(share.id, share.clone());
        Ok(())
    }

    async fn get_shared_post(&self, share_id: Uuid) -> Result<Option<SharedPost>> {
        Ok(self.read()?.shared_posts.get(&share_id).cloned())
    }

    async fn get_post_shares(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SharedPost>> {
        let state = self.read()?;
        let mut shares: Vec<SharedPost> = state
            .shared_posts
            .values()
            .filter(|s| s.post_id == post_id)
            .cloned()
            .collect();
        shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(shares, limit, offset))
    }

    async fn get_profile_shares(
        &self,
        sharer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SharedPost>> {
        let state = self.read()?;
        let mut shares: Vec<SharedPost> = state
            .shared_posts
            .values()
            .filter(|s| s.sharer_id == sharer_id)
            .cloned()
            .collect();
        shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(shares, limit, offset))
    }

    async fn delete_shared_post(&self, share_id: Uuid) -> Result<bool> {
        Ok(self.write()?.shared_posts.remove(&share_id).is_some())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.write()?.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self.read()?.comments.get(&comment_id).cloned())
    }

    async fn get_comments(
        &self,
        target_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>> {
        let state = self.read()?;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.target_id == target_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(page(comments, limit, offset))
    }

    async fn count_comments(&self, target_id: Uuid) -> Result<i64> {
        let state = self.read()?;
        Ok(state
            .comments
            .values()
            .filter(|c| c.target_id == target_id)
            .count() as i64)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let mut state = self.write()?;
        if state.comments.remove(&comment_id).is_none() {
            return Ok(false);
        }
        state.reactions.remove(&comment_id);
        // Replies keep their rows and become unreachable via their target
        Ok(true)
    }

    async fn upsert_reaction(
        &self,
        content_id: Uuid,
        reactor_id: Uuid,
        kind: ReactionKind,
    ) -> Result<(Reaction, bool)> {
        let mut state = self.write()?;
        let reactions = state.reactions.entry(content_id).or_default();

        if let Some(existing) = reactions.iter_mut().find(|r| r.reactor_id == reactor_id) {
            existing.kind = kind;
            return Ok((existing.clone(), false));
        }

        let reaction = Reaction::new(content_id, reactor_id, kind);
        reactions.push(reaction.clone());
        Ok((reaction, true))
    }

    async fn remove_reaction(&self, content_id: Uuid, reactor_id: Uuid) -> Result<bool> {
        let mut state = self.write()?;
        let Some(reactions) = state.reactions.get_mut(&content_id) else {
            return Ok(false);
        };
        let before = reactions.len();
        reactions.retain(|r| r.reactor_id != reactor_id);
        Ok(reactions.len() < before)
    }

    async fn get_reaction(&self, content_id: Uuid, reactor_id: Uuid) -> Result<Option<Reaction>> {
        let state = self.read()?;
        Ok(state
            .reactions
            .get(&content_id)
            .and_then(|rs| rs.iter().find(|r| r.reactor_id == reactor_id))
            .cloned())
    }

    async fn get_reactions(
        &self,
        content_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reaction>> {
        let state = self.read()?;
        let mut reactions = state.reactions.get(&content_id).cloned().unwrap_or_default();
        reactions.reverse();
        Ok(page(reactions, limit, offset))
    }

    async fn reaction_counts(&self, content_id: Uuid) -> Result<HashMap<ReactionKind, i64>> {
        let state = self.read()?;
        let mut counts = HashMap::new();
        if let Some(reactions) = state.reactions.get(&content_id) {
            for reaction in reactions {
                *counts.entry(reaction.kind).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Privacy;

    #[tokio::test]
    async fn upsert_replaces_same_reactor() {
        let repo = MemoryContentRepository::new();
        let content = Uuid::new_v4();
        let carol = Uuid::new_v4();

        let (_, created) = repo
            .upsert_reaction(content, carol, ReactionKind::Like)
            .await
            .unwrap();
        assert!(created);

        let (reaction, created) = repo
            .upsert_reaction(content, carol, ReactionKind::Love)
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(reaction.kind, ReactionKind::Love);

        let reactions = repo.get_reactions(content, 10, 0).await.unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].kind, ReactionKind::Love);
    }

    #[tokio::test]
    async fn cross_reactor_writes_both_land() {
        let repo = MemoryContentRepository::new();
        let content = Uuid::new_v4();

        repo.upsert_reaction(content, Uuid::new_v4(), ReactionKind::Like)
            .await
            .unwrap();
        repo.upsert_reaction(content, Uuid::new_v4(), ReactionKind::Like)
            .await
            .unwrap();

        let counts = repo.reaction_counts(content).await.unwrap();
        assert_eq!(counts.get(&ReactionKind::Like), Some(&2));
    }

    #[tokio::test]
    async fn remove_reaction_is_a_noop_when_absent() {
        let repo = MemoryContentRepository::new();
        let removed = repo
            .remove_reaction(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn delete_post_orphan_marks_shares_and_drops_comments() {
        let repo = MemoryContentRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let post = Post::new(alice, "hello", Privacy::Public);
        repo.insert_post(&post).await.unwrap();

        let share = SharedPost::new(bob, post.id, Privacy::Public);
        repo.insert_shared_post(&share).await.unwrap();

        let comment = Comment::new(bob, post.id, "nice post", post.privacy);
        repo.insert_comment(&comment).await.unwrap();
        repo.upsert_reaction(comment.id, alice, ReactionKind::Like)
            .await
            .unwrap();

        assert!(repo.delete_post(post.id).await.unwrap());

        assert!(repo.get_post(post.id).await.unwrap().is_none());
        assert!(repo.get_comment(comment.id).await.unwrap().is_none());
        assert!(repo
            .reaction_counts(comment.id)
            .await
            .unwrap()
            .is_empty());

        let share = repo.get_shared_post(share.id).await.unwrap().unwrap();
        assert!(share.source_removed);
        assert_eq!(share.post_id, post.id);
    }

    #[tokio::test]
    async fn connections_are_symmetric() {
        let repo = MemoryContentRepository::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        repo.add_connection(a, b).await.unwrap();
        assert!(repo.are_connected(a, b).await.unwrap());
        assert!(repo.are_connected(b, a).await.unwrap());
        assert!(!repo.are_connected(a, Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_constraint_violation() {
        let repo = MemoryContentRepository::new();
        repo.insert_profile(&Profile::new("alice", "Alice", None))
            .await
            .unwrap();
        let err = repo
            .insert_profile(&Profile::new("alice", "Other Alice", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
