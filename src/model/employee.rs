use serde::{Deserialize, Serialize};

/// Employee record used by work-order auto-assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub on_vacation: bool,
}

fn default_true() -> bool {
    true
}
