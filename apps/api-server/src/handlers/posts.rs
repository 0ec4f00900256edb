//! Post handlers.

use actix_web::{HttpResponse, web};

use scribe_core::domain::{Post, PostDraft, RelatedPost, ScoredPost, TaggedPost};
use scribe_shared::MessageResponse;
use scribe_shared::dto::{
    ListResponse, PostRequest, PostResponse, RelatedPostResponse, ScoredPostResponse, SearchQuery,
    TagQuery, TaggedPostResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".to_string()))
}

fn into_draft(req: PostRequest) -> PostDraft {
    PostDraft::new(req.title, req.content, req.tags)
}

fn post_response(post: Post, related: Vec<RelatedPost>) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        tags: post.tags,
        created_at: post.created_at,
        related_posts: related
            .into_iter()
            .map(|r| RelatedPostResponse {
                id: r.id,
                title: r.title,
                tags: r.tags,
            })
            .collect(),
    }
}

fn tagged_response(post: TaggedPost) -> TaggedPostResponse {
    TaggedPostResponse {
        id: post.id,
        title: post.title,
        tags: post.tags,
    }
}

fn scored_response(hit: ScoredPost) -> ScoredPostResponse {
    ScoredPostResponse {
        id: hit.post.id,
        title: hit.post.title,
        content: hit.post.content,
        tags: hit.post.tags,
        created_at: hit.post.created_at,
        score: hit.score,
    }
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state.posts.create_post(into_draft(body.into_inner())).await?;

    Ok(HttpResponse::Created().json(post_response(post, Vec::new())))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let found = state.posts.get_post(id).await?;

    Ok(HttpResponse::Ok().json(post_response(found.post, found.related)))
}

/// PUT /posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state
        .posts
        .update_post(id, into_draft(body.into_inner()))
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post updated successfully")))
}

/// GET /posts/search-by-tag?tag=
pub async fn search_by_tag(
    state: web::Data<AppState>,
    query: web::Query<TagQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.search_by_tag(&query.tag).await?;
    let list: ListResponse<_> = posts
        .into_iter()
        .map(tagged_response)
        .collect::<Vec<_>>()
        .into();

    Ok(HttpResponse::Ok().json(list))
}

/// GET /posts/search?q=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let hits = state.posts.search(&query.q).await?;
    let list: ListResponse<_> = hits
        .into_iter()
        .map(scored_response)
        .collect::<Vec<_>>()
        .into();

    Ok(HttpResponse::Ok().json(list))
}
