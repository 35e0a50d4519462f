use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 100;

    /// Limit clamped to `1..=MAX_LIMIT`, offset floored at zero.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, Self::MAX_LIMIT), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { limit: 500, offset: -3 };
        assert_eq!(p.clamped(), (100, 0));
        let p = Pagination { limit: 0, offset: 10 };
        assert_eq!(p.clamped(), (1, 10));
    }

    #[test]
    fn create_defaults_to_draft() {
        let req: CreateBlogRequest =
            serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(!req.published);
    }
}
