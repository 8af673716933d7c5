pub mod catalog;
pub mod judgment;
pub mod movie_details;
pub mod prediction;
pub mod ratings;

pub use catalog::{list_movies, list_users, user_details};
pub use movie_details::{load_snapshot, movie_details};
pub use prediction::{Predictor, RatingSnapshot, RoundingPolicy};
pub use ratings::submit_rating;
