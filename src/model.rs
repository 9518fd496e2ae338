use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Movie {
    pub title: String,
    pub description: String,
    pub average_rating: f64,
    pub total_reviews: u64,
}

impl Movie {
    pub fn new(title: &str, description: &str) -> Movie {
        Movie {
            title: title.to_owned(),
            description: description.to_owned(),
            average_rating: 0.0,
            total_reviews: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Feedback {
    pub username: String,
    pub email: String,
    pub movie_id: u64,
    pub rating: u8,
    pub comments: String,
    pub created_at: u64,
}

/// Feedback row annotated with its movie's title, for the admin view.
#[derive(Serialize, Debug, Clone)]
pub struct FeedbackWithTitle {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub movie_id: u64,
    pub movie_title: String,
    pub rating: u8,
    pub comments: String,
    pub created_at: u64,
}

/// Current time as seconds since UNIX epoch.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
