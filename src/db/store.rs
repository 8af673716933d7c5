use crate::{
    error::AppResult,
    models::{Movie, MovieId, Rating, User, UserId},
};

/// Read and write access to users, movies and ratings
///
/// The prediction engine only needs the two rating lookups; the rest serves
/// the movie detail and rating submission flows.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingStore: Send + Sync {
    /// Fetch a movie by id
    async fn movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>>;

    /// Fetch a user by id
    async fn user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// All movies, ordered by title
    async fn movies(&self) -> AppResult<Vec<Movie>>;

    /// All users, ordered by id
    async fn users(&self) -> AppResult<Vec<User>>;

    /// Fetch a user by login email
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// All ratings given to a movie
    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>>;

    /// All ratings a user has made
    async fn ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>>;

    /// Insert a rating, or update the score if the user already rated the movie
    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: f64,
    ) -> AppResult<Rating>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
