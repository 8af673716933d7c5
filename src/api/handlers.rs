use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Movie, MovieDetails, MovieId, Rating, RatingRequest, User, UserDetails, UserId},
    services,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct MovieDetailsQuery {
    /// Viewer to predict for; anonymous when absent
    pub user_id: Option<UserId>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// All movies, alphabetically by title
pub async fn list_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Vec<Movie>>> {
    tracing::info!(request_id = %request_id, "Processing movie list request");

    let movies = services::list_movies(state.store.as_ref()).await?;
    Ok(Json(movies))
}

/// All users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Vec<User>>> {
    tracing::info!(request_id = %request_id, "Processing user list request");

    let users = services::list_users(state.store.as_ref()).await?;
    Ok(Json(users))
}

/// A user with their ratings
pub async fn get_user_details(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<UserDetails>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        "Processing user details request"
    );

    let details = services::user_details(state.store.as_ref(), user_id).await?;
    Ok(Json(details))
}

/// Movie details with average, prediction and judgment for the viewer
pub async fn get_movie_details(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(movie_id): Path<MovieId>,
    Query(query): Query<MovieDetailsQuery>,
) -> AppResult<Json<MovieDetails>> {
    tracing::info!(
        request_id = %request_id,
        movie_id = %movie_id,
        viewer = ?query.user_id,
        "Processing movie details request"
    );

    let details = services::movie_details(
        state.store.as_ref(),
        &state.predictor,
        &state.judge_email,
        movie_id,
        query.user_id,
    )
    .await?;

    Ok(Json(details))
}

/// Add or update a user's rating for a movie
pub async fn rate_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(movie_id): Path<MovieId>,
    Json(request): Json<RatingRequest>,
) -> AppResult<Json<Rating>> {
    tracing::info!(
        request_id = %request_id,
        movie_id = %movie_id,
        user_id = %request.user_id,
        "Processing rating submission"
    );

    let rating = services::submit_rating(
        state.store.as_ref(),
        &state.scale,
        request.user_id,
        movie_id,
        request.score,
    )
    .await?;

    Ok(Json(rating))
}
