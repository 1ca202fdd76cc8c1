// crates/sii-rs-esi/src/model/common.rs

//! Small element shapes reused across the EtherCATInfo schema.

use alloc::string::String;
use serde::{Deserialize, Serialize};

// --- Helper Functions for serde(default) ---

/// Helper function for `#[serde(skip_serializing_if = "is_false")]`
pub(super) fn is_false(b: &bool) -> bool {
    !*b
}

/// Represents `<Name LcId="1033">Value</Name>` and other localized texts.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LocalizedName {
    #[serde(rename = "@LcId", default, skip_serializing_if = "Option::is_none")]
    pub lc_id: Option<String>,
    #[serde(rename = "$value", default)]
    pub value: String,
}

impl LocalizedName {
    pub fn new(value: &str) -> Self {
        Self {
            lc_id: Some("1033".into()),
            value: value.into(),
        }
    }
}

/// A protocol marker element such as `<FoE/>`. Its attributes are not mapped.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Protocol {}
