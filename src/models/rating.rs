use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MovieId, UserId};

/// A user's score for a movie
///
/// There is at most one rating per (user, movie) pair; resubmitting updates
/// `score` and `updated_at` in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, score: f64) -> Self {
        Self {
            user_id,
            movie_id,
            score,
            updated_at: Utc::now(),
        }
    }
}

/// Request body for submitting a rating
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatingRequest {
    pub user_id: UserId,
    pub score: f64,
}

/// Valid score range for a deployment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub min: f64,
    pub max: f64,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

impl ScoreScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Checks that a submitted score is a finite number inside the range
    pub fn contains(&self, score: f64) -> bool {
        score.is_finite() && score >= self.min && score <= self.max
    }
}
