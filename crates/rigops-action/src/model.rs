//! Asset records the builders operate on

use crate::ids::{RackId, ThingId};
use serde::{Deserialize, Serialize};

/// A miner as seen in the inventory list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Miner {
    /// Record id
    pub id: ThingId,
    /// Owning rack; may be missing on legacy records
    #[serde(default)]
    pub rack_id: Option<RackId>,
    /// Inventory code
    #[serde(default)]
    pub code: Option<String>,
    /// Container the miner is housed in
    #[serde(default)]
    pub container: Option<String>,
    /// Spare parts currently linked to this miner
    #[serde(default)]
    pub spare_parts: Vec<SparePart>,
}

impl Miner {
    /// Create a miner with no parts
    #[must_use]
    pub fn new(id: impl Into<ThingId>, rack_id: Option<RackId>) -> Self {
        Self {
            id: id.into(),
            rack_id,
            code: None,
            container: None,
            spare_parts: Vec::new(),
        }
    }

    /// With inventory code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// With linked spare parts
    #[must_use]
    pub fn with_spare_parts(mut self, parts: Vec<SparePart>) -> Self {
        self.spare_parts = parts;
        self
    }
}

impl From<&str> for Miner {
    fn from(id: &str) -> Self {
        Self::new(id, None)
    }
}

/// A spare part record
///
/// Both fields are optional because parts are often reported by
/// partially-populated inventory rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    /// Record id
    #[serde(default)]
    pub id: Option<ThingId>,
    /// Owning rack
    #[serde(default)]
    pub rack_id: Option<RackId>,
}

impl SparePart {
    /// Create a fully identified part
    #[must_use]
    pub fn new(id: impl Into<ThingId>, rack_id: impl Into<RackId>) -> Self {
        Self {
            id: Some(id.into()),
            rack_id: Some(rack_id.into()),
        }
    }

    /// Whether the part carries both an id and a rack
    #[inline]
    #[must_use]
    pub fn is_addressable(&self) -> bool {
        self.id.is_some() && self.rack_id.is_some()
    }
}
