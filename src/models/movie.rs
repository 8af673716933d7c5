use serde::{Deserialize, Serialize};

use super::MovieId;

/// A movie that users can rate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    /// Unique identifier for the movie
    pub id: MovieId,
    /// Display title
    pub title: String,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Everything the movie detail view shows about one movie for one viewer
///
/// Every score is optional: `None` means "not enough data", which is distinct
/// from a legitimate score of zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub movie: Movie,
    /// Mean of all scores given to the movie
    pub average: Option<f64>,
    /// The viewer's own score, if they have rated the movie
    pub user_score: Option<f64>,
    /// Predicted score for a viewer who has not rated the movie yet
    pub prediction: Option<f64>,
    /// Observed or predicted score of the reference judge
    pub judge_score: Option<f64>,
    /// Absolute difference between the judge's and the viewer's effective score
    pub deviation: Option<f64>,
    /// Message picked from the severity list by the deviation
    pub judgment: Option<String>,
}
