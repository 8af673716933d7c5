use std::collections::BTreeSet;

use tracing::instrument;

use crate::{
    db::RatingStore,
    error::{AppError, AppResult},
    models::{MovieDetails, MovieId, UserId},
    services::{
        judgment::{deviation, judgment_for},
        prediction::{Predictor, RatingSnapshot},
    },
};

/// Assembles the ratings a prediction for `movie_id` needs
///
/// Fetches everyone who rated the movie plus each of `targets`, then every
/// one of those raters' full histories, so similarities can be computed
/// without further lookups.
pub async fn load_snapshot(
    store: &dyn RatingStore,
    movie_id: MovieId,
    targets: &[UserId],
) -> AppResult<RatingSnapshot> {
    let movie_ratings = store.ratings_for_movie(movie_id).await?;

    let raters: BTreeSet<UserId> = movie_ratings
        .iter()
        .map(|r| r.user_id)
        .chain(targets.iter().copied())
        .collect();

    let mut snapshot = RatingSnapshot::from_ratings(&movie_ratings);
    for user_id in &raters {
        let history = store.ratings_by_user(*user_id).await?;
        for rating in &history {
            snapshot.insert(rating.user_id, rating.movie_id, rating.score);
        }
    }

    tracing::debug!(
        movie_id = %movie_id,
        raters = raters.len(),
        "Rating snapshot loaded"
    );

    Ok(snapshot)
}

/// Builds the movie detail view for an optional viewer
///
/// The viewer gets a predicted score only when they have not rated the movie
/// themselves. The judge account is compared against whichever score the
/// viewer effectively has; a missing judge simply means no judgment.
#[instrument(skip(store, predictor), fields(store_name = store.name()))]
pub async fn movie_details(
    store: &dyn RatingStore,
    predictor: &Predictor,
    judge_email: &str,
    movie_id: MovieId,
    viewer: Option<UserId>,
) -> AppResult<MovieDetails> {
    let movie = store
        .movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {}", movie_id)))?;

    if let Some(viewer_id) = viewer {
        if store.user(viewer_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {}", viewer_id)));
        }
    }

    let judge = store.user_by_email(judge_email).await?;
    if judge.is_none() {
        tracing::warn!(judge_email = %judge_email, "Judge account not found, skipping judgment");
    }

    let targets: Vec<UserId> = viewer
        .into_iter()
        .chain(judge.as_ref().map(|j| j.id))
        .collect();
    let snapshot = load_snapshot(store, movie_id, &targets).await?;

    let observed = |user_id: UserId| {
        snapshot
            .rater(user_id)
            .and_then(|profile| profile.score_for(movie_id))
    };

    let average = predictor.mean_item_score(&snapshot, movie_id);
    let user_score = viewer.and_then(observed);

    let prediction = match viewer {
        Some(viewer_id) if user_score.is_none() => {
            predictor.predict_rating(&snapshot, viewer_id, movie_id)
        }
        _ => None,
    };
    let effective_score = prediction.or(user_score);

    let judge_score = judge.as_ref().and_then(|j| {
        observed(j.id).or_else(|| predictor.predict_rating(&snapshot, j.id, movie_id))
    });

    let deviation = deviation(judge_score, effective_score);
    let judgment = deviation.map(|d| judgment_for(d).to_string());

    tracing::info!(
        movie_id = %movie_id,
        has_prediction = prediction.is_some(),
        has_judgment = judgment.is_some(),
        "Movie details computed"
    );

    Ok(MovieDetails {
        movie,
        average,
        user_score,
        prediction,
        judge_score,
        deviation,
        judgment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockRatingStore;
    use crate::models::{Movie, Rating, User};
    use crate::services::judgment::JUDGMENT_MESSAGES;
    use crate::services::prediction::RoundingPolicy;

    const JUDGE: &str = "the-eye@of-judgment.com";

    /// Ratings where user 2 tracks user 1 and user 3 mirrors user 1.
    /// Movie 10 is rated by users 2 and 3 only.
    fn fixture() -> Vec<Rating> {
        [
            (1, 1, 1.0),
            (1, 2, 3.0),
            (1, 3, 5.0),
            (2, 1, 2.0),
            (2, 2, 3.0),
            (2, 3, 4.0),
            (2, 10, 5.0),
            (3, 1, 5.0),
            (3, 2, 3.0),
            (3, 3, 1.0),
            (3, 10, 1.0),
        ]
        .into_iter()
        .map(|(user, movie, score)| Rating::new(UserId(user), MovieId(movie), score))
        .collect()
    }

    fn mock_store(ratings: Vec<Rating>, judge: Option<UserId>) -> MockRatingStore {
        let mut store = MockRatingStore::new();
        store
            .expect_movie()
            .returning(|id| Ok(Some(Movie::new(id, "Toy Story (1995)"))));
        store
            .expect_user()
            .returning(|id| Ok(Some(User::new(id, format!("user{}@example.com", id)))));
        store
            .expect_user_by_email()
            .returning(move |email| Ok(judge.map(|id| User::new(id, email))));

        let for_movie = ratings.clone();
        store.expect_ratings_for_movie().returning(move |movie_id| {
            Ok(for_movie
                .iter()
                .filter(|r| r.movie_id == movie_id)
                .cloned()
                .collect())
        });
        store.expect_ratings_by_user().returning(move |user_id| {
            Ok(ratings
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect())
        });
        store.expect_name().return_const("mock");
        store
    }

    #[tokio::test]
    async fn test_unknown_movie_is_not_found() {
        let mut store = MockRatingStore::new();
        store.expect_movie().returning(|_| Ok(None));
        store.expect_name().return_const("mock");

        let result =
            movie_details(&store, &Predictor::default(), JUDGE, MovieId(99), None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_viewer_is_not_found() {
        let mut store = MockRatingStore::new();
        store
            .expect_movie()
            .returning(|id| Ok(Some(Movie::new(id, "Heat"))));
        store.expect_user().returning(|_| Ok(None));
        store.expect_name().return_const("mock");

        let result = movie_details(
            &store,
            &Predictor::default(),
            JUDGE,
            MovieId(1),
            Some(UserId(42)),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_viewer_gets_prediction_and_judgment() {
        // User 3 is the judge: it rated movie 10 with a 1
        let store = mock_store(fixture(), Some(UserId(3)));
        let predictor = Predictor::new(RoundingPolicy::NearestStep(1.0));

        let details = movie_details(&store, &predictor, JUDGE, MovieId(10), Some(UserId(1)))
            .await
            .unwrap();

        assert_eq!(details.average, Some(3.0));
        assert_eq!(details.user_score, None);
        assert_eq!(details.prediction, Some(5.0));
        assert_eq!(details.judge_score, Some(1.0));
        assert_eq!(details.deviation, Some(4.0));
        assert_eq!(details.judgment.as_deref(), Some(JUDGMENT_MESSAGES[4]));
    }

    #[tokio::test]
    async fn test_viewer_who_rated_is_not_predicted() {
        let store = mock_store(fixture(), Some(UserId(3)));

        let details = movie_details(
            &store,
            &Predictor::default(),
            JUDGE,
            MovieId(10),
            Some(UserId(2)),
        )
        .await
        .unwrap();

        assert_eq!(details.user_score, Some(5.0));
        assert_eq!(details.prediction, None);
        assert_eq!(details.deviation, Some(4.0));
    }

    #[tokio::test]
    async fn test_missing_judge_skips_judgment() {
        let store = mock_store(fixture(), None);

        let details = movie_details(
            &store,
            &Predictor::default(),
            JUDGE,
            MovieId(10),
            Some(UserId(1)),
        )
        .await
        .unwrap();

        assert!(details.prediction.is_some());
        assert_eq!(details.judge_score, None);
        assert_eq!(details.deviation, None);
        assert_eq!(details.judgment, None);
    }

    #[tokio::test]
    async fn test_anonymous_viewer_sees_average_only() {
        let store = mock_store(fixture(), Some(UserId(3)));

        let details = movie_details(&store, &Predictor::default(), JUDGE, MovieId(10), None)
            .await
            .unwrap();

        assert_eq!(details.average, Some(3.0));
        assert_eq!(details.prediction, None);
        assert_eq!(details.judge_score, Some(1.0));
        assert_eq!(details.judgment, None);
    }

    #[tokio::test]
    async fn test_unrated_movie_has_no_average() {
        let store = mock_store(fixture(), Some(UserId(3)));

        let details = movie_details(
            &store,
            &Predictor::default(),
            JUDGE,
            MovieId(20),
            Some(UserId(1)),
        )
        .await
        .unwrap();

        assert_eq!(details.average, None);
        assert_eq!(details.prediction, None);
        assert_eq!(details.judge_score, None);
        assert_eq!(details.judgment, None);
    }

    #[tokio::test]
    async fn test_load_snapshot_includes_target_history() {
        let store = mock_store(fixture(), None);

        let snapshot = load_snapshot(&store, MovieId(10), &[UserId(1)]).await.unwrap();

        assert_eq!(snapshot.rater(UserId(1)).map(|p| p.len()), Some(3));
        assert_eq!(snapshot.rater(UserId(2)).map(|p| p.len()), Some(4));
        assert_eq!(snapshot.scores_for_movie(MovieId(10)).count(), 2);
    }
}
