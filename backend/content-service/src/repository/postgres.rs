/// PostgreSQL repository for the content subsystem (production store)
///
/// Enum-valued columns are stored as text and parsed on the way out; a value
/// the domain does not know is reported as a storage failure, not a caller
/// error. Every multi-row logical operation runs in one transaction so a
/// partial write can never become visible.
use crate::domain::{
    Comment, ContentItem, Post, Privacy, Profile, ReactableItem, Reaction, ReactionKind,
    SharedPost,
};
use crate::error::{AppError, Result};
use crate::repository::ContentRepository;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool from configuration
    pub async fn connect(config: &crate::config::DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Health check
    pub async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(true)
    }
}

fn stored_privacy(value: &str) -> Result<Privacy> {
    Privacy::parse(value).map_err(|_| AppError::Storage(format!("unknown privacy in store: {value}")))
}

fn stored_kind(value: &str) -> Result<ReactionKind> {
    ReactionKind::parse(value)
        .map_err(|_| AppError::Storage(format!("unknown reaction kind in store: {value}")))
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: String,
    display_name: String,
    bio: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            bio: row.bio,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    body: String,
    privacy: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self> {
        Ok(Post {
            id: row.id,
            author_id: row.author_id,
            body: row.body,
            privacy: stored_privacy(&row.privacy)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SharedPostRow {
    id: Uuid,
    sharer_id: Uuid,
    post_id: Uuid,
    source_removed: bool,
    privacy: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SharedPostRow> for SharedPost {
    type Error = AppError;

    fn try_from(row: SharedPostRow) -> Result<Self> {
        Ok(SharedPost {
            id: row.id,
            sharer_id: row.sharer_id,
            post_id: row.post_id,
            source_removed: row.source_removed,
            privacy: stored_privacy(&row.privacy)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    commentor_id: Uuid,
    target_id: Uuid,
    body: String,
    privacy: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = AppError;

    fn try_from(row: CommentRow) -> Result<Self> {
        Ok(Comment {
            id: row.id,
            commentor_id: row.commentor_id,
            target_id: row.target_id,
            body: row.body,
            privacy: stored_privacy(&row.privacy)?,
            created_at: row.created_at,
        })
    }
}

/// Reaction row plus the inserted/updated probe from the upsert
#[derive(sqlx::FromRow)]
struct ReactionRow {
    id: Uuid,
    content_id: Uuid,
    reactor_id: Uuid,
    kind: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReactionRow> for Reaction {
    type Error = AppError;

    fn try_from(row: ReactionRow) -> Result<Self> {
        Ok(Reaction {
            id: row.id,
            content_id: row.content_id,
            reactor_id: row.reactor_id,
            kind: stored_kind(&row.kind)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UpsertedReactionRow {
    id: Uuid,
    content_id: Uuid,
    reactor_id: Uuid,
    kind: String,
    created_at: DateTime<Utc>,
    was_created: i64,
}

#[async_trait::async_trait]
impl ContentRepository for PgContentRepository {
    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, username, display_name, bio, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.username)
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_profile(&self, username: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, username, display_name, bio, created_at
            FROM profiles
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn get_profile_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, username, display_name, bio, created_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Reactions the profile issued anywhere
        sqlx::query("DELETE FROM reactions WHERE reactor_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Reactions on comments under the profile's posts, then the
        // comments themselves
        sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE content_id IN (
                SELECT id FROM comments
                WHERE target_id IN (SELECT id FROM posts WHERE author_id = $1)
            )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM comments
            WHERE target_id IN (SELECT id FROM posts WHERE author_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Comments the profile authored elsewhere, with their reactions
        sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE content_id IN (SELECT id FROM comments WHERE commentor_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM comments WHERE commentor_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Reactions on the posts, the profile's own shares, and orphan
        // marks on other profiles' shares of those posts
        sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE content_id IN (SELECT id FROM posts WHERE author_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM shared_posts WHERE sharer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE shared_posts SET source_removed = TRUE
            WHERE post_id IN (SELECT id FROM posts WHERE author_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM posts WHERE author_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM connections WHERE profile_a = $1 OR profile_b = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_connection(&self, a: Uuid, b: Uuid) -> Result<()> {
        // Stored once per pair, normalized ordering
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        sqlx::query(
            r#"
            INSERT INTO connections (profile_a, profile_b, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (profile_a, profile_b) DO NOTHING
            "#,
        )
        .bind(lo)
        .bind(hi)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn are_connected(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM connections
                WHERE profile_a = $1 AND profile_b = $2
            )
            "#,
        )
        .bind(lo)
        .bind(hi)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn get_content(&self, content_id: Uuid) -> Result<Option<ContentItem>> {
        if let Some(post) = self.get_post(content_id).await? {
            return Ok(Some(ContentItem::Post(post)));
        }
        if let Some(share) = self.get_shared_post(content_id).await? {
            return Ok(Some(ContentItem::SharedPost(share)));
        }
        if let Some(comment) = self.get_comment(content_id).await? {
            return Ok(Some(ContentItem::Comment(comment)));
        }
        Ok(None)
    }

    async fn get_reactable(&self, content_id: Uuid) -> Result<Option<ReactableItem>> {
        if let Some(post) = self.get_post(content_id).await? {
            return Ok(Some(ReactableItem::Post(post)));
        }
        if let Some(comment) = self.get_comment(content_id).await? {
            return Ok(Some(ReactableItem::Comment(comment)));
        }
        Ok(None)
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, body, privacy, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.body)
        .bind(post.privacy.as_str())
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, body, privacy, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::try_from).transpose()
    }

    async fn get_profile_posts(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, body, privacy, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Reactions on the post and on the comments it owns
        sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE content_id = $1
               OR content_id IN (SELECT id FROM comments WHERE target_id = $1)
            "#,
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM comments WHERE target_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        // Shares survive the source, orphan-marked
        sqlx::query("UPDATE shared_posts SET source_removed = TRUE WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_shared_post(&self, share: &SharedPost) -> Result<()> {
        // No uniqueness on (sharer, post): re-sharing keeps share history
        sqlx::query(
            r#"
            INSERT INTO shared_posts (id, sharer_id, post_id, source_removed, privacy, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(share.id)
        .bind(share.sharer_id)
        .bind(share.post_id)
        .bind(share.source_removed)
        .bind(share.privacy.as_str())
        .bind(share.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_shared_post(&self, share_id: Uuid) -> Result<Option<SharedPost>> {
        let row = sqlx::query_as::<_, SharedPostRow>(
            r#"
            SELECT id, sharer_id, post_id, source_removed, privacy, created_at
            FROM shared_posts
            WHERE id = $1
            "#,
        )
        .bind(share_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SharedPost::try_from).transpose()
    }

    async fn get_post_shares(
        &self,
        post_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SharedPost>> {
        let rows = sqlx::query_as::<_, SharedPostRow>(
            r#"
            SELECT id, sharer_id, post_id, source_removed, privacy, created_at
            FROM shared_posts
            WHERE post_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SharedPost::try_from).collect()
    }

    async fn get_profile_shares(
        &self,
        sharer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SharedPost>> {
        let rows = sqlx::query_as::<_, SharedPostRow>(
            r#"
            SELECT id, sharer_id, post_id, source_removed, privacy, created_at
            FROM shared_posts
            WHERE sharer_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(sharer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SharedPost::try_from).collect()
    }

    async fn delete_shared_post(&self, share_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shared_posts WHERE id = $1")
            .bind(share_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, commentor_id, target_id, body, privacy, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id)
        .bind(comment.commentor_id)
        .bind(comment.target_id)
        .bind(&comment.body)
        .bind(comment.privacy.as_str())
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, commentor_id, target_id, body, privacy, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Comment::try_from).transpose()
    }

    async fn get_comments(
        &self,
        target_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, commentor_id, target_id, body, privacy, created_at
            FROM comments
            WHERE target_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(target_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    async fn count_comments(&self, target_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE target_id = $1")
                .bind(target_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reactions WHERE content_id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        // Replies keep their rows; they become unreachable through the
        // target-resolution layer
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_reaction(
        &self,
        content_id: Uuid,
        reactor_id: Uuid,
        kind: ReactionKind,
    ) -> Result<(Reaction, bool)> {
        // xmax = 0 means the row was freshly inserted rather than updated
        let row = sqlx::query_as::<_, UpsertedReactionRow>(
            r#"
            INSERT INTO reactions (id, content_id, reactor_id, kind, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (content_id, reactor_id) DO UPDATE
            SET kind = EXCLUDED.kind
            RETURNING id, content_id, reactor_id, kind, created_at,
                      (xmax = 0)::int8 AS was_created
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(content_id)
        .bind(reactor_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        let reaction = Reaction {
            id: row.id,
            content_id: row.content_id,
            reactor_id: row.reactor_id,
            kind: stored_kind(&row.kind)?,
            created_at: row.created_at,
        };

        Ok((reaction, row.was_created == 1))
    }

    async fn remove_reaction(&self, content_id: Uuid, reactor_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM reactions WHERE content_id = $1 AND reactor_id = $2")
                .bind(content_id)
                .bind(reactor_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_reaction(&self, content_id: Uuid, reactor_id: Uuid) -> Result<Option<Reaction>> {
        let row = sqlx::query_as::<_, ReactionRow>(
            r#"
            SELECT id, content_id, reactor_id, kind, created_at
            FROM reactions
            WHERE content_id = $1 AND reactor_id = $2
            "#,
        )
        .bind(content_id)
        .bind(reactor_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Reaction::try_from).transpose()
    }

    async fn get_reactions(
        &self,
        content_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reaction>> {
        let rows = sqlx::query_as::<_, ReactionRow>(
            r#"
            SELECT id, content_id, reactor_id, kind, created_at
            FROM reactions
            WHERE content_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(content_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reaction::try_from).collect()
    }

    async fn reaction_counts(&self, content_id: Uuid) -> Result<HashMap<ReactionKind, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT kind, COUNT(*)
            FROM reactions
            WHERE content_id = $1
            GROUP BY kind
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::new();
        for (kind, count) in rows {
            counts.insert(stored_kind(&kind)?, count);
        }

        Ok(counts)
    }
}
