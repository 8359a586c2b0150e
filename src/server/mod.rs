//! JSON API server

mod error;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::content::{NewPost, Post, PostPatch};
use crate::error::BlogError;
use crate::query::{Paginated, PostQuery};
use crate::service::{BlogService, PostDetail};
use crate::Folio;

pub use error::{AppError, AppResult};

type SharedService = Arc<BlogService>;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub html: String,
}

/// Build the router. Admin routes are only mounted when `admin` is set.
pub fn router(service: SharedService, admin: bool) -> Router {
    let mut app = Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(show_post))
        .route("/api/tags", get(list_tags))
        .route("/api/preview", post(preview));

    if admin {
        app = app
            .route("/api/admin/posts", get(admin_list).post(admin_create))
            .route(
                "/api/admin/posts/:id",
                put(admin_update).delete(admin_delete),
            )
            .route("/api/admin/posts/:id/publish", post(admin_toggle_publish));
    }

    app.layer(TraceLayer::new_for_http()).with_state(service)
}

/// Start the API server
pub async fn start(folio: &Folio, ip: &str, port: u16) -> Result<()> {
    let app = router(folio.service.clone(), folio.config.admin);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if !folio.config.admin {
        println!("Admin routes disabled.");
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn list_posts(
    State(service): State<SharedService>,
    Query(query): Query<PostQuery>,
) -> Json<Paginated<Post>> {
    Json(service.list_published(&query).await)
}

async fn show_post(
    State(service): State<SharedService>,
    Path(slug): Path<String>,
) -> AppResult<Json<PostDetail>> {
    service
        .post_detail(&slug)
        .await
        .map(Json)
        .ok_or_else(|| BlogError::not_found(slug).into())
}

async fn list_tags(State(service): State<SharedService>) -> Json<Vec<String>> {
    Json(service.list_tags().await)
}

async fn preview(
    State(service): State<SharedService>,
    Json(request): Json<PreviewRequest>,
) -> Json<PreviewResponse> {
    Json(PreviewResponse {
        html: service.preview(&request.content),
    })
}

async fn admin_list(State(service): State<SharedService>) -> Json<Vec<Post>> {
    Json(service.list_all().await)
}

async fn admin_create(
    State(service): State<SharedService>,
    Json(post): Json<NewPost>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let post = service.create(post).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn admin_update(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> AppResult<Json<Post>> {
    Ok(Json(service.update(&id, patch).await?))
}

async fn admin_delete(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_toggle_publish(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> AppResult<Json<Post>> {
    Ok(Json(service.toggle_publish(&id).await?))
}
