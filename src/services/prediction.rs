use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::models::{MovieId, Rating, UserId};

/// Co-rated movies needed before a correlation is meaningful
const MIN_CO_RATED: usize = 2;

/// Why a similarity or prediction could not be produced
///
/// Ordinary callers only see `None`; the variants exist for diagnostics.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Unpredictable {
    #[error("Insufficient data: {0}")]
    InsufficientData(Shortfall),
    #[error("No signal: a rater gave the same score to every co-rated movie")]
    NoSignal,
}

/// Which piece of data was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
    /// The two raters share fewer than two rated movies
    TooFewCoRated,
    /// Nobody else has rated the target movie
    NoOtherRaters,
    /// Nobody who rated the movie correlates positively with the target rater
    NoCorrelatedNeighbors,
    /// The movie has no ratings at all
    NoRatings,
}

impl std::fmt::Display for Shortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Shortfall::TooFewCoRated => "too few co-rated movies",
            Shortfall::NoOtherRaters => "no other raters for this movie",
            Shortfall::NoCorrelatedNeighbors => "no positively correlated raters",
            Shortfall::NoRatings => "movie has no ratings",
        };
        f.write_str(reason)
    }
}

/// How a raw weighted average is turned into a reported score
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RoundingPolicy {
    /// Report the weighted average unchanged
    #[default]
    Exact,
    /// Round to the nearest multiple of the step (1.0 for whole-star scores)
    NearestStep(f64),
}

impl RoundingPolicy {
    pub fn from_step(step: Option<f64>) -> Self {
        match step {
            Some(step) if step.is_finite() && step > 0.0 => RoundingPolicy::NearestStep(step),
            _ => RoundingPolicy::Exact,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            RoundingPolicy::Exact => value,
            RoundingPolicy::NearestStep(step) if step > 0.0 => (value / step).round() * step,
            RoundingPolicy::NearestStep(_) => value,
        }
    }
}

/// One rater's scores, keyed by movie in id order
#[derive(Debug, Clone, PartialEq)]
pub struct RaterProfile {
    pub user_id: UserId,
    scores: BTreeMap<MovieId, f64>,
}

impl RaterProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            scores: BTreeMap::new(),
        }
    }

    /// Records a score, replacing any earlier score for the same movie
    pub fn rate(&mut self, movie_id: MovieId, score: f64) {
        self.scores.insert(movie_id, score);
    }

    pub fn with_score(mut self, movie_id: MovieId, score: f64) -> Self {
        self.rate(movie_id, score);
        self
    }

    pub fn score_for(&self, movie_id: MovieId) -> Option<f64> {
        self.scores.get(&movie_id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Paired scores over the movies both raters have scored
    ///
    /// Walks the two sorted maps once, so the pairs always come out in
    /// movie-id order regardless of which rater is `self`.
    pub fn co_rated(&self, other: &RaterProfile) -> Vec<(f64, f64)> {
        let mut pairs = Vec::new();
        let mut mine = self.scores.iter().peekable();
        let mut theirs = other.scores.iter().peekable();

        while let (Some((a_id, a)), Some((b_id, b))) = (mine.peek(), theirs.peek()) {
            match a_id.cmp(b_id) {
                std::cmp::Ordering::Less => {
                    mine.next();
                }
                std::cmp::Ordering::Greater => {
                    theirs.next();
                }
                std::cmp::Ordering::Equal => {
                    pairs.push((**a, **b));
                    mine.next();
                    theirs.next();
                }
            }
        }

        pairs
    }
}

/// Read-only view of the ratings a prediction is computed over
///
/// Built once per request; later writes to the store are not observed.
#[derive(Debug, Clone, Default)]
pub struct RatingSnapshot {
    raters: HashMap<UserId, RaterProfile>,
    by_movie: HashMap<MovieId, BTreeMap<UserId, f64>>,
}

impl RatingSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ratings<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> Self {
        let mut snapshot = Self::new();
        for rating in ratings {
            snapshot.insert(rating.user_id, rating.movie_id, rating.score);
        }
        snapshot
    }

    /// Adds a score; a second score for the same pair replaces the first
    pub fn insert(&mut self, user_id: UserId, movie_id: MovieId, score: f64) {
        self.raters
            .entry(user_id)
            .or_insert_with(|| RaterProfile::new(user_id))
            .rate(movie_id, score);
        self.by_movie
            .entry(movie_id)
            .or_default()
            .insert(user_id, score);
    }

    pub fn rater(&self, user_id: UserId) -> Option<&RaterProfile> {
        self.raters.get(&user_id)
    }

    /// Scores given to a movie, in user-id order
    pub fn scores_for_movie(&self, movie_id: MovieId) -> impl Iterator<Item = (UserId, f64)> + '_ {
        self.by_movie
            .get(&movie_id)
            .into_iter()
            .flat_map(|scores| scores.iter().map(|(user, score)| (*user, *score)))
    }
}

/// Pearson correlation over paired samples
///
/// Returns an error rather than dividing when either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Result<f64, Unpredictable> {
    if pairs.len() < MIN_CO_RATED {
        return Err(Unpredictable::InsufficientData(Shortfall::TooFewCoRated));
    }

    // Checked on the raw scores: a flat fractional series can leave a tiny
    // nonzero spread after the mean is subtracted.
    let (first_a, first_b) = pairs[0];
    if pairs.iter().all(|(a, _)| *a == first_a) || pairs.iter().all(|(_, b)| *b == first_b) {
        return Err(Unpredictable::NoSignal);
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut numerator = 0.0_f64;
    let mut spread_a = 0.0_f64;
    let mut spread_b = 0.0_f64;
    for (a, b) in pairs {
        let da = a - mean_a;
        let db = b - mean_b;
        numerator += da * db;
        spread_a += da * da;
        spread_b += db * db;
    }

    let denominator = spread_a.sqrt() * spread_b.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(Unpredictable::NoSignal);
    }

    Ok((numerator / denominator).clamp(-1.0, 1.0))
}

/// Similarity between two raters, with the reason when there is none
pub fn explain_similarity(a: &RaterProfile, b: &RaterProfile) -> Result<f64, Unpredictable> {
    pearson(&a.co_rated(b))
}

/// Pearson similarity between two raters over their co-rated movies
///
/// `None` means the raters cannot be compared, which is not the same as a
/// coefficient of zero.
pub fn compute_similarity(a: &RaterProfile, b: &RaterProfile) -> Option<f64> {
    explain_similarity(a, b).ok()
}

/// Arithmetic mean of the given scores, `None` for an empty input
pub fn mean_score(scores: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Neighbour-weighted rating predictor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Predictor {
    rounding: RoundingPolicy,
}

impl Predictor {
    pub fn new(rounding: RoundingPolicy) -> Self {
        Self { rounding }
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    /// Predicts the score `user_id` would give `movie_id`
    pub fn predict_rating(
        &self,
        snapshot: &RatingSnapshot,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Option<f64> {
        self.explain_prediction(snapshot, user_id, movie_id).ok()
    }

    /// Like [`Predictor::predict_rating`], keeping the reason for a missing result
    pub fn explain_prediction(
        &self,
        snapshot: &RatingSnapshot,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Result<f64, Unpredictable> {
        let scored: Vec<(UserId, f64)> = snapshot.scores_for_movie(movie_id).collect();
        if scored.is_empty() {
            return Err(Unpredictable::InsufficientData(Shortfall::NoRatings));
        }

        let others: Vec<(UserId, f64)> = scored
            .into_iter()
            .filter(|(other, _)| *other != user_id)
            .collect();
        if others.is_empty() {
            return Err(Unpredictable::InsufficientData(Shortfall::NoOtherRaters));
        }

        let empty = RaterProfile::new(user_id);
        let target = snapshot.rater(user_id).unwrap_or(&empty);

        let mut weighted_sum = 0.0_f64;
        let mut weight_total = 0.0_f64;
        let mut neighbors = 0usize;

        for (other_id, other_score) in others {
            let Some(other) = snapshot.rater(other_id) else {
                continue;
            };
            match compute_similarity(target, other) {
                Some(coefficient) if coefficient > 0.0 => {
                    weighted_sum += coefficient * other_score;
                    weight_total += coefficient.abs();
                    neighbors += 1;
                }
                _ => {}
            }
        }

        if neighbors == 0 || weight_total == 0.0 {
            return Err(Unpredictable::InsufficientData(
                Shortfall::NoCorrelatedNeighbors,
            ));
        }

        tracing::debug!(
            user_id = %user_id,
            movie_id = %movie_id,
            neighbors,
            "Weighted prediction computed"
        );

        Ok(self.rounding.apply(weighted_sum / weight_total))
    }

    /// Mean of every score the movie has received
    pub fn mean_item_score(&self, snapshot: &RatingSnapshot, movie_id: MovieId) -> Option<f64> {
        mean_score(snapshot.scores_for_movie(movie_id).map(|(_, score)| score))
    }
}
