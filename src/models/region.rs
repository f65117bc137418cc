//! Region definitions.

use serde::{Deserialize, Serialize};

/// A regional bestseller list published each week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    /// Short identifier used on the command line and in storage paths
    pub code: String,

    /// Display name (e.g., "New England")
    pub name: String,

    /// Suffix appended to the date in the list file name
    pub file_code: String,
}

impl Region {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        file_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            file_code: file_code.into(),
        }
    }
}
