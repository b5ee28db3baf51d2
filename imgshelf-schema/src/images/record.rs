use serde::{Deserialize, Serialize};

/// One hosted image as exposed by the gallery API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageRecord {
    pub id: i64,
    /// Fully-qualified public URL of the stored object.
    pub url: String,
    #[serde(default)]
    pub description: String,
}
