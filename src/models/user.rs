use serde::{Deserialize, Serialize};

use super::{Rating, UserId};

/// A registered user who can rate movies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for the user
    pub id: UserId,
    /// Login email, also used to locate the reference judge account
    pub email: String,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// A user together with every rating they have made
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    /// Ordered by movie id
    pub ratings: Vec<Rating>,
}
