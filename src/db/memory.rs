use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Movie, MovieId, Rating, User, UserId},
};

use super::RatingStore;

/// Rating store kept entirely in process memory
///
/// Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct InMemoryRatingStore {
    inner: Arc<RwLock<InMemoryInner>>,
}

#[derive(Default)]
struct InMemoryInner {
    users: HashMap<UserId, User>,
    movies: HashMap<MovieId, Movie>,
    ratings: HashMap<(UserId, MovieId), Rating>,
}

impl InMemoryRatingStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user
    pub async fn insert_user(&self, user: User) {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id, user);
    }

    /// Adds or replaces a movie
    pub async fn insert_movie(&self, movie: Movie) {
        let mut inner = self.inner.write().await;
        inner.movies.insert(movie.id, movie);
    }

    /// Loads a small fixed data set: a handful of viewers, a few movies, and
    /// the judge account with opinions of its own
    pub async fn seed_demo(&self, judge_email: &str) {
        let users = [
            User::new(UserId(1), judge_email),
            User::new(UserId(2), "ada@example.com"),
            User::new(UserId(3), "grace@example.com"),
            User::new(UserId(4), "linus@example.com"),
        ];
        let movies = [
            Movie::new(MovieId(1), "Toy Story (1995)"),
            Movie::new(MovieId(2), "GoldenEye (1995)"),
            Movie::new(MovieId(3), "Four Rooms (1995)"),
            Movie::new(MovieId(4), "Get Shorty (1995)"),
            Movie::new(MovieId(5), "Copycat (1995)"),
        ];
        let ratings = [
            (1, 1, 5.0),
            (1, 2, 3.0),
            (1, 3, 1.0),
            (2, 1, 4.0),
            (2, 2, 3.0),
            (2, 3, 2.0),
            (2, 4, 5.0),
            (3, 1, 1.0),
            (3, 2, 4.0),
            (3, 3, 5.0),
            (3, 4, 2.0),
            (4, 1, 5.0),
            (4, 3, 1.0),
            (4, 5, 4.0),
        ];

        let mut inner = self.inner.write().await;
        for user in users {
            inner.users.insert(user.id, user);
        }
        for movie in movies {
            inner.movies.insert(movie.id, movie);
        }
        for (user, movie, score) in ratings {
            let rating = Rating::new(UserId(user), MovieId(movie), score);
            inner.ratings.insert((rating.user_id, rating.movie_id), rating);
        }

        tracing::info!(
            users = inner.users.len(),
            movies = inner.movies.len(),
            ratings = inner.ratings.len(),
            "Seeded demo data"
        );
    }
}

#[async_trait::async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.get(&movie_id).cloned())
    }

    async fn user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn movies(&self) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let mut movies: Vec<Movie> = inner.movies.values().cloned().collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(movies)
    }

    async fn users(&self) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        let mut ratings: Vec<Rating> = inner
            .ratings
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect();
        ratings.sort_by_key(|r| r.user_id);
        Ok(ratings)
    }

    async fn ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        let mut ratings: Vec<Rating> = inner
            .ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        ratings.sort_by_key(|r| r.movie_id);
        Ok(ratings)
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: f64,
    ) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;
        let rating = inner
            .ratings
            .entry((user_id, movie_id))
            .and_modify(|existing| {
                existing.score = score;
                existing.updated_at = Utc::now();
            })
            .or_insert_with(|| Rating::new(user_id, movie_id, score));
        Ok(rating.clone())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
