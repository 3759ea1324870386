//! Display language.

use serde::{Deserialize, Serialize};

/// A language slides can be translated into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i32,
    pub iso_code: String,
    #[serde(default)]
    pub is_rtl: bool,
}
