/// Entity model for the content/sharing/reaction subsystem
///
/// Three content variants share a common identity (ID, privacy, type tag,
/// timestamp): Post and Comment are reaction-capable, SharedPost is a
/// privacy-scoped re-publication that wraps a Post without duplicating its
/// comment/reaction semantics. Entities reference each other by ID; nothing
/// here holds a second owner of anything.
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visibility scope carried by every content variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Privacy {
    Public,
    Private,
    Connections,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "PUBLIC",
            Privacy::Private => "PRIVATE",
            Privacy::Connections => "CONNECTIONS",
        }
    }

    /// Parse a caller-supplied privacy value; unknown values are a
    /// validation failure, never silently defaulted.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "PUBLIC" => Ok(Privacy::Public),
            "PRIVATE" => Ok(Privacy::Private),
            "CONNECTIONS" => Ok(Privacy::Connections),
            other => Err(AppError::Validation(format!(
                "unknown privacy value: {other}"
            ))),
        }
    }
}

/// Discriminator tag, fixed by each variant's constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Post,
    SharedPost,
    Comment,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Post => "Post",
            ContentType::SharedPost => "SharedPost",
            ContentType::Comment => "Comment",
        }
    }
}

/// Sentiment kinds a profile can attach to reaction-capable content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionKind {
    Like,
    Love,
    Laugh,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "LIKE",
            ReactionKind::Love => "LOVE",
            ReactionKind::Laugh => "LAUGH",
            ReactionKind::Wow => "WOW",
            ReactionKind::Sad => "SAD",
            ReactionKind::Angry => "ANGRY",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "LIKE" => Ok(ReactionKind::Like),
            "LOVE" => Ok(ReactionKind::Love),
            "LAUGH" => Ok(ReactionKind::Laugh),
            "WOW" => Ok(ReactionKind::Wow),
            "SAD" => Ok(ReactionKind::Sad),
            "ANGRY" => Ok(ReactionKind::Angry),
            other => Err(AppError::Validation(format!(
                "unknown reaction kind: {other}"
            ))),
        }
    }
}

/// Profile entity - the identity that authors posts, shares, comments and
/// reactions. Username is the unique external key; the ID is internal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(username: &str, display_name: &str, bio: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            display_name: display_name.to_string(),
            bio: bio.map(|b| b.to_string()),
            created_at: Utc::now(),
        }
    }
}

/// Post entity - authored content; owns its comments and reactions, while
/// shares of it are back-references it does not own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Set once at construction, immutable afterwards
    pub author_id: Uuid,
    pub body: String,
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: Uuid, body: &str, privacy: Privacy) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            body: body.to_string(),
            privacy,
            created_at: Utc::now(),
        }
    }
}

/// SharedPost entity - a profile's re-publication of an existing Post with
/// its own privacy. References the original by ID and never owns it; when
/// the original is deleted the share survives with `source_removed` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedPost {
    pub id: Uuid,
    pub sharer_id: Uuid,
    pub post_id: Uuid,
    pub source_removed: bool,
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
}

impl SharedPost {
    pub fn new(sharer_id: Uuid, post_id: Uuid, privacy: Privacy) -> Self {
        Self {
            id: Uuid::new_v4(),
            sharer_id,
            post_id,
            source_removed: false,
            privacy,
            created_at: Utc::now(),
        }
    }
}

/// Comment entity - annotation attached to any reaction-capable content, so
/// `target_id` may name a Post or another Comment (threaded reply). The
/// target is referenced, not owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub commentor_id: Uuid,
    pub target_id: Uuid,
    pub body: String,
    /// Inherited from the target at creation time
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(commentor_id: Uuid, target_id: Uuid, body: &str, privacy: Privacy) -> Self {
        Self {
            id: Uuid::new_v4(),
            commentor_id,
            target_id,
            body: body.to_string(),
            privacy,
            created_at: Utc::now(),
        }
    }
}

/// Reaction entity - a (reactor, kind) pair on a reaction-capable content
/// item; unique per reactor, replacement keeps the original timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub content_id: Uuid,
    pub reactor_id: Uuid,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(content_id: Uuid, reactor_id: Uuid, kind: ReactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            content_id,
            reactor_id,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Uniform view over the three content variants. Feed builders, privacy
/// filters and notification dispatch go through this instead of inspecting
/// concrete types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentItem {
    Post(Post),
    SharedPost(SharedPost),
    Comment(Comment),
}

impl ContentItem {
    pub fn content_id(&self) -> Uuid {
        match self {
            ContentItem::Post(p) => p.id,
            ContentItem::SharedPost(s) => s.id,
            ContentItem::Comment(c) => c.id,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ContentItem::Post(_) => ContentType::Post,
            ContentItem::SharedPost(_) => ContentType::SharedPost,
            ContentItem::Comment(_) => ContentType::Comment,
        }
    }

    pub fn privacy(&self) -> Privacy {
        match self {
            ContentItem::Post(p) => p.privacy,
            ContentItem::SharedPost(s) => s.privacy,
            ContentItem::Comment(c) => c.privacy,
        }
    }

    pub fn posted_at(&self) -> DateTime<Utc> {
        match self {
            ContentItem::Post(p) => p.created_at,
            ContentItem::SharedPost(s) => s.created_at,
            ContentItem::Comment(c) => c.created_at,
        }
    }

    /// Resolve the semantically correct owner: a post's author, a share's
    /// sharer (not the original post's author), a comment's commentor.
    pub fn main_author_id(&self) -> Uuid {
        match self {
            ContentItem::Post(p) => p.author_id,
            ContentItem::SharedPost(s) => s.sharer_id,
            ContentItem::Comment(c) => c.commentor_id,
        }
    }
}

/// View over the content variants that accept reactions and comments.
/// SharedPost deliberately has no place here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReactableItem {
    Post(Post),
    Comment(Comment),
}

impl ReactableItem {
    pub fn content_id(&self) -> Uuid {
        match self {
            ReactableItem::Post(p) => p.id,
            ReactableItem::Comment(c) => c.id,
        }
    }

    pub fn privacy(&self) -> Privacy {
        match self {
            ReactableItem::Post(p) => p.privacy,
            ReactableItem::Comment(c) => c.privacy,
        }
    }

    pub fn into_content_item(self) -> ContentItem {
        match self {
            ReactableItem::Post(p) => ContentItem::Post(p),
            ReactableItem::Comment(c) => ContentItem::Comment(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_tag_matches_variant() {
        let author = Profile::new("alice", "Alice", None);
        let post = Post::new(author.id, "hello", Privacy::Public);
        let share = SharedPost::new(Uuid::new_v4(), post.id, Privacy::Private);
        let comment = Comment::new(Uuid::new_v4(), post.id, "nice post", post.privacy);

        assert_eq!(
            ContentItem::Post(post).content_type(),
            ContentType::Post
        );
        assert_eq!(
            ContentItem::SharedPost(share).content_type(),
            ContentType::SharedPost
        );
        assert_eq!(
            ContentItem::Comment(comment).content_type(),
            ContentType::Comment
        );
    }

    #[test]
    fn main_author_resolves_per_variant() {
        let alice = Profile::new("alice", "Alice", None);
        let bob = Profile::new("bob", "Bob", None);
        let carol = Profile::new("carol", "Carol", None);

        let post = Post::new(alice.id, "hello", Privacy::Public);
        let share = SharedPost::new(bob.id, post.id, Privacy::Private);
        let comment = Comment::new(carol.id, post.id, "nice post", post.privacy);

        assert_eq!(ContentItem::Post(post).main_author_id(), alice.id);
        // A share is attributed to the sharer, never the original author.
        assert_eq!(ContentItem::SharedPost(share).main_author_id(), bob.id);
        assert_eq!(ContentItem::Comment(comment).main_author_id(), carol.id);
    }

    #[test]
    fn share_keeps_its_own_privacy() {
        let post = Post::new(Uuid::new_v4(), "hello", Privacy::Public);
        let share = SharedPost::new(Uuid::new_v4(), post.id, Privacy::Private);
        assert_eq!(share.privacy, Privacy::Private);
        assert_eq!(share.post_id, post.id);
        assert!(!share.source_removed);
    }

    #[test]
    fn privacy_parse_rejects_unknown_values() {
        assert_eq!(Privacy::parse("PUBLIC").unwrap(), Privacy::Public);
        assert_eq!(
            Privacy::parse("CONNECTIONS").unwrap(),
            Privacy::Connections
        );
        assert!(matches!(
            Privacy::parse("friends-only"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn reaction_kind_round_trips_through_text() {
        for kind in [
            ReactionKind::Like,
            ReactionKind::Love,
            ReactionKind::Laugh,
            ReactionKind::Wow,
            ReactionKind::Sad,
            ReactionKind::Angry,
        ] {
            assert_eq!(ReactionKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(ReactionKind::parse("MEH").is_err());
    }

    #[test]
    fn enums_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&Privacy::Connections).unwrap(),
            "\"CONNECTIONS\""
        );
        assert_eq!(
            serde_json::to_string(&ReactionKind::Love).unwrap(),
            "\"LOVE\""
        );
        assert_eq!(
            serde_json::to_string(&ContentType::SharedPost).unwrap(),
            "\"SharedPost\""
        );
    }
}
