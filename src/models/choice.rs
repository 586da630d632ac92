use serde::{Deserialize, Serialize};

use crate::models::Action;

/// One video's recorded action, as sent to and echoed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub video_id: String,
    pub action: Action,
}

/// Ordered list of choices mirroring the batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    pub choices: Vec<Choice>,
}
