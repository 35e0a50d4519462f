use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Blog, BlogChanges, NewBlog, PublishedBlog};

/// Persistence for blog posts. Mutations are scoped to the author; a blog
/// owned by someone else behaves as if it did not exist.
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn create_blog(&self, author_id: Uuid, new: &NewBlog) -> anyhow::Result<Blog>;

    async fn update_blog(
        &self,
        author_id: Uuid,
        id: Uuid,
        changes: &BlogChanges,
    ) -> anyhow::Result<Option<Blog>>;

    async fn find_blog(&self, id: Uuid) -> anyhow::Result<Option<Blog>>;

    /// Published blogs, newest first.
    async fn list_published(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<PublishedBlog>>;

    /// The author's unpublished blogs, newest first.
    async fn list_drafts(&self, author_id: Uuid) -> anyhow::Result<Vec<Blog>>;

    async fn publish_blog(&self, author_id: Uuid, id: Uuid) -> anyhow::Result<Option<Blog>>;

    /// Returns whether a row was deleted.
    async fn delete_blog(&self, author_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

const BLOG_COLUMNS: &str = "id, author_id, title, content, published, created_at, updated_at";

#[derive(Clone)]
pub struct PgBlogStore {
    db: PgPool,
}

impl PgBlogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlogStore for PgBlogStore {
    async fn create_blog(&self, author_id: Uuid, new: &NewBlog) -> anyhow::Result<Blog> {
        let sql = format!(
            "INSERT INTO blogs (id, author_id, title, content, published)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {BLOG_COLUMNS}"
        );
        let blog = sqlx::query_as::<_, Blog>(&sql)
            .bind(Uuid::new_v4())
            .bind(author_id)
            .bind(&new.title)
            .bind(&new.content)
            .bind(new.published)
            .fetch_one(&self.db)
            .await
            .context("insert blog")?;
        Ok(blog)
    }

    async fn update_blog(
        &self,
        author_id: Uuid,
        id: Uuid,
        changes: &BlogChanges,
    ) -> anyhow::Result<Option<Blog>> {
        let sql = format!(
            "UPDATE blogs
                SET title = COALESCE($3, title),
                    content = COALESCE($4, content),
                    updated_at = now()
              WHERE id = $1 AND author_id = $2
             RETURNING {BLOG_COLUMNS}"
        );
        let blog = sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .bind(author_id)
            .bind(changes.title.as_deref())
            .bind(changes.content.as_deref())
            .fetch_optional(&self.db)
            .await
            .context("update blog")?;
        Ok(blog)
    }

    async fn find_blog(&self, id: Uuid) -> anyhow::Result<Option<Blog>> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1");
        let blog = sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find blog")?;
        Ok(blog)
    }

    async fn list_published(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<PublishedBlog>> {
        let rows = sqlx::query_as::<_, PublishedBlog>(
            r#"
            SELECT b.id, b.author_id, u.name AS author_name, b.title, b.content, b.created_at
              FROM blogs b
              JOIN users u ON u.id = b.author_id
             WHERE b.published
             ORDER BY b.created_at DESC
             LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list published blogs")?;
        Ok(rows)
    }

    async fn list_drafts(&self, author_id: Uuid) -> anyhow::Result<Vec<Blog>> {
        let sql = format!(
            "SELECT {BLOG_COLUMNS}
               FROM blogs
              WHERE author_id = $1 AND NOT published
              ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Blog>(&sql)
            .bind(author_id)
            .fetch_all(&self.db)
            .await
            .context("list drafts")?;
        Ok(rows)
    }

    async fn publish_blog(&self, author_id: Uuid, id: Uuid) -> anyhow::Result<Option<Blog>> {
        let sql = format!(
            "UPDATE blogs
                SET published = TRUE, updated_at = now()
              WHERE id = $1 AND author_id = $2
             RETURNING {BLOG_COLUMNS}"
        );
        let blog = sqlx::query_as::<_, Blog>(&sql)
            .bind(id)
            .bind(author_id)
            .fetch_optional(&self.db)
            .await
            .context("publish blog")?;
        Ok(blog)
    }

    async fn delete_blog(&self, author_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM blogs WHERE id = $1 AND author_id = $2"#)
            .bind(id)
            .bind(author_id)
            .execute(&self.db)
            .await
            .context("delete blog")?;
        Ok(res.rows_affected() > 0)
    }
}
