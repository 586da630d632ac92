use serde::{Deserialize, Serialize};

/// Parameters for matching against recently published videos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByDateStrategySettings {
    pub days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByRatingStrategySettings {}

/// Parameters for matching within a fraction of the existing ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinetuneStrategySettings {
    pub fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RandomStrategySettings {}

/// Which matching strategy the backend should use to assemble the next
/// batch. At most one strategy is expected to be set; the backend decides
/// what to do otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingSettings {
    pub by_date_strategy: Option<ByDateStrategySettings>,
    pub by_rating_strategy: Option<ByRatingStrategySettings>,
    pub finetune_strategy: Option<FinetuneStrategySettings>,
    pub random_strategy: Option<RandomStrategySettings>,
}

/// The settings object sent with every fetch/submit/skip request. The
/// selection core treats it as opaque and never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub matching_settings: MatchingSettings,
}
