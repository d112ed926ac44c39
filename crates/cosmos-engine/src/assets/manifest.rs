use serde::{Deserialize, Serialize};

/// Points of interest as shipped to or from the host, in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiManifest {
    pub pois: Vec<PoiDescriptor>,
}

/// One named camera target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiDescriptor {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub description: String,
}

impl PoiManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
