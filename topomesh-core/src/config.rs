//! Mesher Configuration

use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Static settings of a [`Mesher`](crate::Mesher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
    /// Run [`MeshStore::validate`](crate::MeshStore::validate) after every
    /// commit and abort on failure. Expensive.
    pub validate_on_commit: bool,

    /// Initial mesh capacity of the store.
    pub store_capacity: usize,
}

impl MesherConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, MeshError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            validate_on_commit: false,
            store_capacity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let config = MesherConfig::from_json(r#"{ "validate_on_commit": true }"#).unwrap();
        assert!(config.validate_on_commit);
        assert_eq!(config.store_capacity, 0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            MesherConfig::from_json("{ validate"),
            Err(MeshError::InvalidConfig(_))
        ));
    }
}
