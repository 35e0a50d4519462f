//! Process-local store used by tests and `STORE=memory`.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{repo::UserStore, repo_types::User},
    blogs::{
        repo::BlogStore,
        repo_types::{Blog, BlogChanges, NewBlog, PublishedBlog},
    },
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    blogs: HashMap<Uuid, Blog>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> OffsetDateTime) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.map(str::to_string),
            password_hash: password_hash.to_string(),
            refresh_token: None,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> anyhow::Result<()> {
        if let Some(user) = self.inner.write().await.users.get_mut(&id) {
            user.refresh_token = token.map(str::to_string);
        }
        Ok(())
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_blog(&self, author_id: Uuid, new: &NewBlog) -> anyhow::Result<Blog> {
        let now = OffsetDateTime::now_utc();
        let blog = Blog {
            id: Uuid::new_v4(),
            author_id,
            title: new.title.clone(),
            content: new.content.clone(),
            published: new.published,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.blogs.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn update_blog(
        &self,
        author_id: Uuid,
        id: Uuid,
        changes: &BlogChanges,
    ) -> anyhow::Result<Option<Blog>> {
        let mut inner = self.inner.write().await;
        let Some(blog) = inner.blogs.get_mut(&id).filter(|b| b.author_id == author_id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            blog.title = title.clone();
        }
        if let Some(content) = &changes.content {
            blog.content = content.clone();
        }
        blog.updated_at = OffsetDateTime::now_utc();
        Ok(Some(blog.clone()))
    }

    async fn find_blog(&self, id: Uuid) -> anyhow::Result<Option<Blog>> {
        Ok(self.inner.read().await.blogs.get(&id).cloned())
    }

    async fn list_published(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<PublishedBlog>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<PublishedBlog> = inner
            .blogs
            .values()
            .filter(|b| b.published)
            .filter_map(|b| {
                let author = inner.users.get(&b.author_id)?;
                Some(PublishedBlog {
                    id: b.id,
                    author_id: b.author_id,
                    author_name: author.name.clone(),
                    title: b.title.clone(),
                    content: b.content.clone(),
                    created_at: b.created_at,
                })
            })
            .collect();
        newest_first(&mut rows, |b| b.created_at);
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_drafts(&self, author_id: Uuid) -> anyhow::Result<Vec<Blog>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Blog> = inner
            .blogs
            .values()
            .filter(|b| b.author_id == author_id && !b.published)
            .cloned()
            .collect();
        newest_first(&mut rows, |b| b.created_at);
        Ok(rows)
    }

    async fn publish_blog(&self, author_id: Uuid, id: Uuid) -> anyhow::Result<Option<Blog>> {
        let mut inner = self.inner.write().await;
        let Some(blog) = inner.blogs.get_mut(&id).filter(|b| b.author_id == author_id) else {
            return Ok(None);
        };
        blog.published = true;
        blog.updated_at = OffsetDateTime::now_utc();
        Ok(Some(blog.clone()))
    }

    async fn delete_blog(&self, author_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .blogs
            .get(&id)
            .is_some_and(|b| b.author_id == author_id);
        if owned {
            inner.blogs.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        assert!(store.create_user("a@b.co", None, "h").await.unwrap().is_some());
        assert!(store.create_user("a@b.co", None, "h").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_token_overwrite_and_clear() {
        let store = MemoryStore::new();
        let user = store.create_user("a@b.co", None, "h").await.unwrap().unwrap();
        store.set_refresh_token(user.id, Some("one")).await.unwrap();
        store.set_refresh_token(user.id, Some("two")).await.unwrap();
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("two"));
        store.set_refresh_token(user.id, None).await.unwrap();
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
    }

    #[tokio::test]
    async fn published_listing_pages() {
        let store = MemoryStore::new();
        let user = store.create_user("a@b.co", Some("Ann"), "h").await.unwrap().unwrap();
        for i in 0..5 {
            let new = NewBlog {
                title: format!("post {i}"),
                content: String::new(),
                published: i % 2 == 0,
            };
            store.create_blog(user.id, &new).await.unwrap();
        }
        assert_eq!(store.list_published(10, 0).await.unwrap().len(), 3);
        assert_eq!(store.list_published(2, 0).await.unwrap().len(), 2);
        assert_eq!(store.list_published(10, 2).await.unwrap().len(), 1);
        assert_eq!(store.list_drafts(user.id).await.unwrap().len(), 2);
        assert_eq!(
            store.list_published(1, 0).await.unwrap()[0].author_name.as_deref(),
            Some("Ann")
        );
    }
}
