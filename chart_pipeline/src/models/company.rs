use serde::{Deserialize, Serialize};

/// Descriptive metadata for a listed company. Every field is optional because
/// providers frequently omit some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMeta {
    #[serde(default, alias = "shortName")]
    pub short_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}
