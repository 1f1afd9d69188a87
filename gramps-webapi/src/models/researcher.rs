//! Researcher model: the owner record of a family tree.

use serde::{Deserialize, Serialize};

/// The researcher (owner) of a family tree.
///
/// Every field is optional in storage; missing values read back as empty
/// strings, so a tree without a researcher record yields `Researcher::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Researcher {
    pub name: String,
    pub address: String,
    pub locality: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal: String,
    pub phone: String,
    pub email: String,
}

impl Researcher {
    /// Create a researcher record with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Name of the researcher (empty if unset).
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
