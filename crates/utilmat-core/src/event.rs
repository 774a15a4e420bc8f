// crates/utilmat-core/src/event.rs
//
// Rating events as they arrive from an event source, and the resolved
// form the reshaper consumes after catalog lookup.

use serde::{Deserialize, Serialize};

/// Prefix of every utility matrix row key.
pub const USER_KEY_PREFIX: &str = "User_";

/// Build the row key for a raw user identifier (`"User_" + user_id`).
pub fn user_key(user_id: &str) -> String {
    format!("{}{}", USER_KEY_PREFIX, user_id)
}

/// A single (user, item, rating) observation.
///
/// Field aliases accept MovieLens-style column headers (`userId`, `movieId`)
/// so records can be deserialized straight from a ratings file. Unknown
/// columns such as `timestamp` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    #[serde(alias = "userId")]
    pub user_id: String,

    #[serde(alias = "movieId", alias = "itemId")]
    pub item_id: String,

    pub rating: f64,
}

impl RatingEvent {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, rating: f64) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }
}

/// A rating event whose item id was found in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEvent {
    pub user_id: String,
    pub item_name: String,
    pub rating: f64,
}
