use crate::{
    db::RatingStore,
    error::{AppError, AppResult},
    models::{Movie, User, UserDetails, UserId},
};

/// Every movie, alphabetically by title
pub async fn list_movies(store: &dyn RatingStore) -> AppResult<Vec<Movie>> {
    let movies = store.movies().await?;
    tracing::debug!(count = movies.len(), "Listed movies");
    Ok(movies)
}

/// Every user, by id
pub async fn list_users(store: &dyn RatingStore) -> AppResult<Vec<User>> {
    let users = store.users().await?;
    tracing::debug!(count = users.len(), "Listed users");
    Ok(users)
}

/// A user and all the ratings they have made
pub async fn user_details(store: &dyn RatingStore, user_id: UserId) -> AppResult<UserDetails> {
    let user = store
        .user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

    let mut ratings = store.ratings_by_user(user_id).await?;
    ratings.sort_by_key(|r| r.movie_id);

    Ok(UserDetails { user, ratings })
}
