use serde::{Deserialize, Serialize};

/// Per-video disposition chosen by the user. Every video in the current
/// batch carries exactly one of these; `Nothing` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Nothing,
    Select,
    Remove,
}

impl Action {
    pub fn is_nothing(self) -> bool {
        self == Action::Nothing
    }
}
