use glam::Vec3;

use crate::api::error::{CosmosError, CosmosResult};
use crate::assets::manifest::{PoiDescriptor, PoiManifest};

/// A named fixed camera target.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub name: String,
    pub position: Vec3,
    pub description: String,
}

impl PointOfInterest {
    fn new(name: &str, position: [f32; 3], description: &str) -> Self {
        Self {
            name: name.to_string(),
            position: Vec3::from_array(position),
            description: description.to_string(),
        }
    }
}

/// Ordered registry of points of interest, looked up by exact name.
#[derive(Debug, Clone)]
pub struct PoiRegistry {
    pois: Vec<PointOfInterest>,
}

impl PoiRegistry {
    pub fn new() -> Self {
        Self { pois: Vec::new() }
    }

    /// The built-in tour of the generated cosmos.
    pub fn builtin() -> Self {
        Self {
            pois: vec![
                PointOfInterest::new("Origin", [0.0, 0.0, 100.0], "The galactic center viewpoint"),
                PointOfInterest::new(
                    "Nebula Core",
                    [50.0, 20.0, -50.0],
                    "A dense region of ionized gas",
                ),
                PointOfInterest::new("Singularity", [-80.0, -30.0, -100.0], "The Great Devourer"),
                PointOfInterest::new(
                    "Milky Way Band",
                    [200.0, 0.0, 0.0],
                    "The dense star-lane of our home galaxy",
                ),
                PointOfInterest::new(
                    "Spiral Galaxy Field",
                    [800.0, 400.0, -1200.0],
                    "A cluster of distant spiral galaxies",
                ),
                PointOfInterest::new("The Void Portal", [0.0, -60.0, -200.0], "An ancient gateway"),
            ],
        }
    }

    /// Build a registry from a parsed manifest. Later duplicates of a name are skipped.
    pub fn from_manifest(manifest: &PoiManifest) -> Self {
        let mut registry = Self::new();
        for PoiDescriptor { name, position, description } in &manifest.pois {
            if registry.find(name).is_some() {
                log::warn!("duplicate point of interest '{name}' ignored");
                continue;
            }
            registry.pois.push(PointOfInterest::new(name, *position, description));
        }
        registry
    }

    /// Look up a point of interest by name. Returns None if not found.
    pub fn find(&self, name: &str) -> Option<&PointOfInterest> {
        self.pois.iter().find(|p| p.name == name)
    }

    /// Like `find`, but reports a miss as an error.
    pub fn require(&self, name: &str) -> CosmosResult<&PointOfInterest> {
        self.find(name)
            .ok_or_else(|| CosmosError::UnknownPoi(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.pois.iter()
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }
}

impl Default for PoiRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let reg = PoiRegistry::builtin();
        let poi = reg.find("Singularity").expect("singularity should exist");
        assert_eq!(poi.position, Vec3::new(-80.0, -30.0, -100.0));
        assert!((poi.position.length() - 17300f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn unknown_returns_none() {
        let reg = PoiRegistry::builtin();
        assert!(reg.find("Andromeda").is_none());
        assert!(matches!(reg.require("Andromeda"), Err(CosmosError::UnknownPoi(_))));
    }

    #[test]
    fn names_are_unique() {
        let json = r#"{ "pois": [
            { "name": "A", "position": [1, 0, 0] },
            { "name": "A", "position": [2, 0, 0] }
        ] }"#;
        let manifest = PoiManifest::from_json(json).unwrap();
        let reg = PoiRegistry::from_manifest(&manifest);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find("A").unwrap().position.x, 1.0);
    }
}
