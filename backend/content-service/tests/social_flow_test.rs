//! End-to-end scenarios over the service layer and the in-memory store:
//! profiles publish posts, share each other's posts, comment, reply and
//! react, and the ownership/cascade rules hold on deletion.

use content_service::domain::{ContentType, Privacy, ReactionKind};
use content_service::error::AppError;
use content_service::repository::{ContentRepository, MemoryContentRepository};
use content_service::services::{
    CommentService, ContentService, PostService, ProfileService, ReactionService, ShareService,
    MAX_THREAD_DEPTH,
};
use content_service::visibility::PrivacyGate;
use std::sync::Arc;

struct Fixture {
    repo: Arc<dyn ContentRepository>,
    profiles: ProfileService,
    posts: PostService,
    shares: ShareService,
    comments: CommentService,
    reactions: ReactionService,
    content: ContentService,
}

fn fixture() -> Fixture {
    let repo: Arc<dyn ContentRepository> = Arc::new(MemoryContentRepository::new());
    let gate = Arc::new(PrivacyGate::new(repo.clone()));
    Fixture {
        repo: repo.clone(),
        profiles: ProfileService::new(repo.clone()),
        posts: PostService::new(repo.clone()),
        shares: ShareService::new(repo.clone(), gate.clone()),
        comments: CommentService::new(repo.clone(), gate.clone()),
        reactions: ReactionService::new(repo.clone()),
        content: ContentService::new(repo),
    }
}

#[tokio::test]
async fn alice_creates_a_post() {
    let f = fixture();
    let alice = f
        .profiles
        .create_profile("alice", "Alice", Some("rustacean"))
        .await
        .unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();

    assert_eq!(post.author_id, alice.id);
    assert_eq!(post.body, "hello");

    let item = f.content.get_content(post.id).await.unwrap();
    assert_eq!(item.content_type(), ContentType::Post);
    assert_eq!(item.main_author_id(), alice.id);

    assert_eq!(f.comments.count_comments(post.id).await.unwrap(), 0);
    assert!(f.reactions.reaction_counts(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn bob_shares_alices_post_privately() {
    let f = fixture();
    let alice = f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    let bob = f.profiles.create_profile("bob", "Bob", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let share = f
        .shares
        .create_share("bob", post.id, Privacy::Private)
        .await
        .unwrap();

    assert_eq!(share.sharer_id, bob.id);
    assert_eq!(share.post_id, post.id);
    assert_eq!(share.privacy, Privacy::Private);
    assert!(!share.source_removed);

    // The share is attributed to the sharer, not the original author.
    let author = f.content.main_author(share.id).await.unwrap();
    assert_eq!(author.id, bob.id);
    assert_ne!(author.id, alice.id);

    let item = f.content.get_content(share.id).await.unwrap();
    assert_eq!(item.content_type(), ContentType::SharedPost);
}

#[tokio::test]
async fn resharing_keeps_share_history() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("bob", "Bob", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();

    let first = f
        .shares
        .create_share("bob", post.id, Privacy::Public)
        .await
        .unwrap();
    let second = f
        .shares
        .create_share("bob", post.id, Privacy::Private)
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let shares = f.shares.get_post_shares(post.id, 10, 0).await.unwrap();
    assert_eq!(shares.len(), 2);
}

#[tokio::test]
async fn sharing_an_invisible_post_is_forbidden() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("bob", "Bob", None).await.unwrap();

    let private = f
        .posts
        .create_post("alice", "just for me", Privacy::Private)
        .await
        .unwrap();
    let err = f
        .shares
        .create_share("bob", private.id, Privacy::Public)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // A connection unlocks CONNECTIONS privacy, but not PRIVATE.
    let gated = f
        .posts
        .create_post("alice", "for connections", Privacy::Connections)
        .await
        .unwrap();
    let err = f
        .shares
        .create_share("bob", gated.id, Privacy::Public)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    f.profiles.connect("alice", "bob").await.unwrap();
    assert!(f
        .shares
        .create_share("bob", gated.id, Privacy::Public)
        .await
        .is_ok());
    assert!(matches!(
        f.shares.create_share("bob", private.id, Privacy::Public).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn carol_comments_on_alices_post() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    let carol = f.profiles.create_profile("carol", "Carol", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let comment = f
        .comments
        .add_comment(post.id, "carol", "nice post")
        .await
        .unwrap();

    assert_eq!(comment.commentor_id, carol.id);
    assert_eq!(comment.target_id, post.id);

    let listed = f.comments.get_comments(post.id, 10, 0).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, comment.id);

    let author = f.content.main_author(comment.id).await.unwrap();
    assert_eq!(author.username, "carol");
}

#[tokio::test]
async fn empty_comment_text_is_rejected() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();

    let err = f
        .comments
        .add_comment(post.id, "alice", "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(f.comments.count_comments(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn shared_posts_do_not_accept_comments_or_reactions() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("bob", "Bob", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let share = f
        .shares
        .create_share("bob", post.id, Privacy::Public)
        .await
        .unwrap();

    assert!(matches!(
        f.comments.add_comment(share.id, "alice", "re-nice").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        f.reactions
            .add_or_update_reaction(share.id, "alice", ReactionKind::Like)
            .await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        f.comments.add_comment(uuid::Uuid::new_v4(), "alice", "hi").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn carol_reacts_like_then_love() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("carol", "Carol", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();

    f.reactions
        .add_or_update_reaction(post.id, "carol", ReactionKind::Like)
        .await
        .unwrap();
    let reaction = f
        .reactions
        .add_or_update_reaction(post.id, "carol", ReactionKind::Love)
        .await
        .unwrap();
    assert_eq!(reaction.kind, ReactionKind::Love);

    let counts = f.reactions.reaction_counts(post.id).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get(&ReactionKind::Love), Some(&1));
    assert_eq!(counts.get(&ReactionKind::Like), None);

    let listed = f.reactions.get_reactions(post.id, 10, 0).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn reactions_attach_to_comments_too() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("carol", "Carol", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let comment = f
        .comments
        .add_comment(post.id, "carol", "nice post")
        .await
        .unwrap();

    f.reactions
        .add_or_update_reaction(comment.id, "alice", ReactionKind::Laugh)
        .await
        .unwrap();
    let counts = f.reactions.reaction_counts(comment.id).await.unwrap();
    assert_eq!(counts.get(&ReactionKind::Laugh), Some(&1));

    assert!(f
        .reactions
        .remove_reaction(comment.id, "alice")
        .await
        .unwrap());
    // Removing again is a no-op, not an error.
    assert!(!f
        .reactions
        .remove_reaction(comment.id, "alice")
        .await
        .unwrap());
}

#[tokio::test]
async fn threaded_replies_share_the_comment_code_path() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("carol", "Carol", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let comment = f
        .comments
        .add_comment(post.id, "carol", "nice post")
        .await
        .unwrap();
    let reply = f
        .comments
        .add_comment(comment.id, "alice", "thanks!")
        .await
        .unwrap();

    assert_eq!(reply.target_id, comment.id);
    let replies = f.comments.get_comments(comment.id, 10, 0).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].id, reply.id);

    // The post's own collection still holds exactly the top-level comment.
    assert_eq!(f.comments.count_comments(post.id).await.unwrap(), 1);
}

#[tokio::test]
async fn reply_depth_is_capped() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();

    let mut target = post.id;
    for i in 0..MAX_THREAD_DEPTH {
        let comment = f
            .comments
            .add_comment(target, "alice", &format!("level {i}"))
            .await
            .unwrap();
        target = comment.id;
    }

    let err = f
        .comments
        .add_comment(target, "alice", "one too deep")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn deleting_a_comment_shrinks_the_target_collection_by_one() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("carol", "Carol", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let first = f
        .comments
        .add_comment(post.id, "carol", "nice post")
        .await
        .unwrap();
    let reply = f
        .comments
        .add_comment(first.id, "alice", "thanks")
        .await
        .unwrap();
    f.comments
        .add_comment(post.id, "alice", "welcome all")
        .await
        .unwrap();

    assert_eq!(f.comments.count_comments(post.id).await.unwrap(), 2);

    // Only the commentor may delete.
    assert!(matches!(
        f.comments.delete_comment(first.id, "alice").await,
        Err(AppError::Forbidden(_))
    ));

    f.comments.delete_comment(first.id, "carol").await.unwrap();
    assert_eq!(f.comments.count_comments(post.id).await.unwrap(), 1);

    // The reply's row survives, but its parent no longer resolves.
    assert!(matches!(
        f.comments.get_comments(first.id, 10, 0).await,
        Err(AppError::NotFound(_))
    ));
    assert!(f.repo.get_comment(reply.id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_post_orphan_marks_its_shares() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("bob", "Bob", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let share = f
        .shares
        .create_share("bob", post.id, Privacy::Public)
        .await
        .unwrap();

    // Only the author may delete the post.
    assert!(matches!(
        f.posts.delete_post(post.id, "bob").await,
        Err(AppError::Forbidden(_))
    ));

    f.posts.delete_post(post.id, "alice").await.unwrap();

    assert!(matches!(
        f.content.get_content(post.id).await,
        Err(AppError::NotFound(_))
    ));

    // The share survives its source, marked as orphaned.
    let share = f.shares.get_share(share.id).await.unwrap();
    assert!(share.source_removed);
}

#[tokio::test]
async fn deleting_a_share_never_touches_the_post() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("bob", "Bob", None).await.unwrap();

    let post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let share = f
        .shares
        .create_share("bob", post.id, Privacy::Public)
        .await
        .unwrap();

    f.shares.delete_share(share.id, "bob").await.unwrap();

    assert!(matches!(
        f.shares.get_share(share.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(f.posts.get_post(post.id).await.is_ok());
}

#[tokio::test]
async fn comments_inherit_target_visibility() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("dave", "Dave", None).await.unwrap();

    let gated = f
        .posts
        .create_post("alice", "for connections", Privacy::Connections)
        .await
        .unwrap();

    let err = f
        .comments
        .add_comment(gated.id, "dave", "let me in")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    f.profiles.connect("alice", "dave").await.unwrap();
    let comment = f
        .comments
        .add_comment(gated.id, "dave", "thanks for the add")
        .await
        .unwrap();
    assert_eq!(comment.privacy, Privacy::Connections);
}

#[tokio::test]
async fn deleting_a_profile_cascades_its_own_content_only() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    f.profiles.create_profile("bob", "Bob", None).await.unwrap();

    let alices_post = f
        .posts
        .create_post("alice", "hello", Privacy::Public)
        .await
        .unwrap();
    let bobs_post = f
        .posts
        .create_post("bob", "hi there", Privacy::Public)
        .await
        .unwrap();
    let bobs_share = f
        .shares
        .create_share("bob", alices_post.id, Privacy::Public)
        .await
        .unwrap();
    f.reactions
        .add_or_update_reaction(bobs_post.id, "alice", ReactionKind::Like)
        .await
        .unwrap();

    f.profiles.delete_profile("alice").await.unwrap();

    assert!(matches!(
        f.profiles.get_profile("alice").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        f.posts.get_post(alices_post.id).await,
        Err(AppError::NotFound(_))
    ));

    // Bob's content survives; his share of alice's post is orphan-marked
    // and his post loses alice's reaction.
    assert!(f.posts.get_post(bobs_post.id).await.is_ok());
    let share = f.shares.get_share(bobs_share.id).await.unwrap();
    assert!(share.source_removed);
    assert!(f
        .reactions
        .reaction_counts(bobs_post.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
    let f = fixture();
    f.profiles.create_profile("alice", "Alice", None).await.unwrap();
    let err = f
        .profiles
        .create_profile("alice", "Other Alice", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
