use serde::{Deserialize, Serialize};

use crate::models::Video;

/// One row of the backend's ranking table. Rank and rating are computed
/// server-side and treated as opaque numbers here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub video: Video,
    pub rank: u32,
    pub rating: f64,
}
