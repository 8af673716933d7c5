use crate::{
    db::RatingStore,
    error::{AppError, AppResult},
    models::{MovieId, Rating, ScoreScale, UserId},
};

/// Records a user's score for a movie, replacing any earlier score
pub async fn submit_rating(
    store: &dyn RatingStore,
    scale: &ScoreScale,
    user_id: UserId,
    movie_id: MovieId,
    score: f64,
) -> AppResult<Rating> {
    if !scale.contains(score) {
        return Err(AppError::InvalidInput(format!(
            "Score must be between {} and {}",
            scale.min, scale.max
        )));
    }

    if store.movie(movie_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Movie {}", movie_id)));
    }
    if store.user(user_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {}", user_id)));
    }

    let rating = store.upsert_rating(user_id, movie_id, score).await?;

    tracing::info!(
        user_id = %user_id,
        movie_id = %movie_id,
        score,
        "Rating saved"
    );

    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockRatingStore;
    use crate::models::{Movie, User};

    #[tokio::test]
    async fn test_out_of_range_score_is_rejected_before_lookup() {
        // No expectations: any store call would panic
        let store = MockRatingStore::new();

        let result = submit_rating(
            &store,
            &ScoreScale::default(),
            UserId(1),
            MovieId(1),
            9.0,
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unknown_movie_is_not_found() {
        let mut store = MockRatingStore::new();
        store.expect_movie().returning(|_| Ok(None));

        let result = submit_rating(
            &store,
            &ScoreScale::default(),
            UserId(1),
            MovieId(1),
            3.0,
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_valid_rating_is_upserted() {
        let mut store = MockRatingStore::new();
        store
            .expect_movie()
            .returning(|id| Ok(Some(Movie::new(id, "Heat"))));
        store
            .expect_user()
            .returning(|id| Ok(Some(User::new(id, "ada@example.com"))));
        store
            .expect_upsert_rating()
            .withf(|user, movie, score| {
                *user == UserId(2) && *movie == MovieId(5) && *score == 4.0
            })
            .times(1)
            .returning(|user, movie, score| Ok(Rating::new(user, movie, score)));

        let rating = submit_rating(
            &store,
            &ScoreScale::default(),
            UserId(2),
            MovieId(5),
            4.0,
        )
        .await
        .unwrap();
        assert_eq!(rating.score, 4.0);
    }
}
