//! Draft listing as the client renders it: one summary per unpublished blog,
//! each pointing at its detail view, plus an empty-state message.

use serde::Serialize;
use time::{macros::format_description, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::Blog;

pub const EMPTY_DRAFTS_MESSAGE: &str = "No drafts found.";

#[derive(Debug, Serialize)]
pub struct DraftSummary {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Creation date as shown next to "Written On".
    pub written_on: String,
    /// Where selecting the draft navigates to.
    pub detail_path: String,
    /// Where the publish action posts to.
    pub publish_path: String,
}

#[derive(Debug, Serialize)]
pub struct DraftList {
    pub drafts: Vec<DraftSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub fn detail_path(id: Uuid) -> String {
    format!("/blog/{id}")
}

fn written_on(at: OffsetDateTime) -> String {
    at.date()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

impl From<Blog> for DraftSummary {
    fn from(b: Blog) -> Self {
        Self {
            written_on: written_on(b.created_at),
            detail_path: detail_path(b.id),
            publish_path: format!("/api/v1/blog/{}/publish", b.id),
            id: b.id,
            title: b.title,
            content: b.content,
            created_at: b.created_at,
        }
    }
}

impl DraftList {
    pub fn from_blogs(blogs: Vec<Blog>) -> Self {
        let drafts: Vec<DraftSummary> = blogs
            .into_iter()
            .filter(|b| !b.published)
            .map(DraftSummary::from)
            .collect();
        let message = drafts.is_empty().then_some(EMPTY_DRAFTS_MESSAGE);
        Self { drafts, message }
    }
}
