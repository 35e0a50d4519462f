use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    drafts::DraftList,
    dto::{CreateBlogRequest, Pagination, UpdateBlogRequest},
    repo_types::{Blog, BlogChanges, NewBlog, PublishedBlog},
};
use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/blog/bulk", get(list_published))
        .route("/blog/drafts", get(list_drafts))
        .route("/blog/:id", get(get_blog))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/blog", post(create_blog))
        .route("/blog/:id", axum::routing::put(update_blog).delete(delete_blog))
        .route("/blog/:id/publish", post(publish_blog))
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[instrument(skip(state, body))]
pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreateBlogRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Blog>)> {
    let Json(payload) = body?;
    let title = non_blank(Some(payload.title))
        .ok_or_else(|| ApiError::BadRequest("Title is required".into()))?;

    let blog = state
        .blogs
        .create_blog(
            user_id,
            &NewBlog {
                title,
                content: payload.content,
                published: payload.published,
            },
        )
        .await?;
    info!(blog_id = %blog.id, %user_id, published = blog.published, "blog created");
    Ok((StatusCode::CREATED, Json(blog)))
}

#[instrument(skip(state, body))]
pub async fn update_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateBlogRequest>, JsonRejection>,
) -> ApiResult<Json<Blog>> {
    let Json(payload) = body?;
    if matches!(&payload.title, Some(t) if t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title is required".into()));
    }
    let changes = BlogChanges {
        title: non_blank(payload.title),
        content: payload.content,
    };

    let blog = state
        .blogs
        .update_blog(user_id, id, &changes)
        .await?
        .ok_or(ApiError::NotFound("Blog"))?;
    Ok(Json(blog))
}

#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Blog>> {
    match state.blogs.find_blog(id).await? {
        Some(blog) if blog.published || blog.author_id == user_id => Ok(Json(blog)),
        _ => Err(ApiError::NotFound("Blog")),
    }
}

#[instrument(skip(state))]
pub async fn list_published(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<PublishedBlog>>> {
    let (limit, offset) = p.clamped();
    let blogs = state.blogs.list_published(limit, offset).await?;
    Ok(Json(blogs))
}

#[instrument(skip(state))]
pub async fn list_drafts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<DraftList>> {
    let drafts = state.blogs.list_drafts(user_id).await?;
    Ok(Json(DraftList::from_blogs(drafts)))
}

#[instrument(skip(state))]
pub async fn publish_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Blog>> {
    let blog = state
        .blogs
        .publish_blog(user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Blog"))?;
    info!(blog_id = %blog.id, %user_id, "blog published");
    Ok(Json(blog))
}

#[instrument(skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.blogs.delete_blog(user_id, id).await? {
        return Err(ApiError::NotFound("Blog"));
    }
    info!(blog_id = %id, %user_id, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};

    use crate::auth::handlers::tests::{body_json, send, signup_user};
    use crate::state::AppState;

    fn authed(method: &str, uri: &str, jwt: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {jwt}"));
        match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn create(state: &AppState, jwt: &str, title: &str) -> Value {
        let res = send(
            state,
            authed(
                "POST",
                "/api/v1/blog",
                jwt,
                Some(json!({"title": title, "content": "Some words"})),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        body_json(res).await
    }

    #[tokio::test]
    async fn blog_routes_require_access_token() {
        let state = AppState::fake();
        let req = Request::builder()
            .uri("/api/v1/blog/drafts")
            .body(Body::empty())
            .unwrap();
        let res = send(&state, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(body_json(res).await["message"].is_string());
    }

    #[tokio::test]
    async fn drafts_empty_state() {
        let state = AppState::fake();
        let (jwt, _) = signup_user(&state, "empty@example.com").await;
        let res = send(&state, authed("GET", "/api/v1/blog/drafts", &jwt, None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["drafts"], json!([]));
        assert_eq!(body["message"], "No drafts found.");
    }

    #[tokio::test]
    async fn publish_moves_draft_to_bulk() {
        let state = AppState::fake();
        let (jwt, _) = signup_user(&state, "writer@example.com").await;
        let blog = create(&state, &jwt, "First post").await;
        let id = blog["id"].as_str().unwrap().to_string();
        assert_eq!(blog["published"], false);

        let res = send(&state, authed("GET", "/api/v1/blog/drafts", &jwt, None)).await;
        let body = body_json(res).await;
        assert_eq!(body["drafts"].as_array().unwrap().len(), 1);
        assert_eq!(body["drafts"][0]["detail_path"], format!("/blog/{id}"));

        let res = send(&state, authed("GET", "/api/v1/blog/bulk", &jwt, None)).await;
        assert_eq!(body_json(res).await, json!([]));

        let res = send(
            &state,
            authed("POST", &format!("/api/v1/blog/{id}/publish"), &jwt, None),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["published"], true);

        let res = send(&state, authed("GET", "/api/v1/blog/drafts", &jwt, None)).await;
        assert_eq!(body_json(res).await["drafts"], json!([]));

        let res = send(&state, authed("GET", "/api/v1/blog/bulk", &jwt, None)).await;
        let bulk = body_json(res).await;
        assert_eq!(bulk[0]["id"], id.as_str());
        assert_eq!(bulk[0]["author_name"], "Tester");
    }

    #[tokio::test]
    async fn drafts_are_private_to_author() {
        let state = AppState::fake();
        let (alice, _) = signup_user(&state, "alice@example.com").await;
        let (bob, _) = signup_user(&state, "bob@example.com").await;
        let blog = create(&state, &alice, "Secret draft").await;
        let id = blog["id"].as_str().unwrap();

        let res = send(&state, authed("GET", "/api/v1/blog/drafts", &bob, None)).await;
        assert_eq!(body_json(res).await["drafts"], json!([]));

        let uri = format!("/api/v1/blog/{id}");
        let res = send(&state, authed("GET", &uri, &bob, None)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = send(&state, authed("GET", &uri, &alice, None)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = send(
            &state,
            authed("POST", &format!("{uri}/publish"), &bob, None),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = send(&state, authed("DELETE", &uri, &bob, None)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_and_delete_own_blog() {
        let state = AppState::fake();
        let (jwt, _) = signup_user(&state, "editor@example.com").await;
        let blog = create(&state, &jwt, "Draft title").await;
        let uri = format!("/api/v1/blog/{}", blog["id"].as_str().unwrap());

        let res = send(
            &state,
            authed("PUT", &uri, &jwt, Some(json!({"title": "Better title"}))),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated = body_json(res).await;
        assert_eq!(updated["title"], "Better title");
        assert_eq!(updated["content"], "Some words");

        let res = send(&state, authed("PUT", &uri, &jwt, Some(json!({"title": "  "})))).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(&state, authed("DELETE", &uri, &jwt, None)).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let res = send(&state, authed("GET", &uri, &jwt, None)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_requires_title() {
        let state = AppState::fake();
        let (jwt, _) = signup_user(&state, "blank@example.com").await;
        let res = send(
            &state,
            authed("POST", "/api/v1/blog", &jwt, Some(json!({"title": "", "content": "x"}))),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
