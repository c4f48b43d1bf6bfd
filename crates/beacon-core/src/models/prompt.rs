use serde::{Deserialize, Serialize};

/// A two-part prompt for the generation function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}
