//! Internal `serde` data structures that map directly to the ESI XML schema.
//!
//! These structs cover the subset of `EtherCATInfo.xsd` that has a
//! counterpart in an SII image. Unknown elements and attributes are skipped
//! on input. Numeric values are kept as strings here and converted by the
//! parser and builder, since ESI mixes `#x` hex and decimal notation.

#![allow(clippy::pedantic)] // XML schema naming conventions differ from Rust

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

pub mod common;
pub mod device;

// Re-export key components for internal use
pub use common::{LocalizedName, Protocol};
pub use device::{
    Coe, CycleTime, Dc, Device, DeviceType, Eeprom, Electrical, Entry, Info, Mailbox, OpMode, Pdo,
    Sm,
};

/// The root element of an ESI file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "EtherCATInfo")]
pub struct EtherCatInfo {
    #[serde(rename = "@xmlns:xsi", default)]
    pub xmlns_xsi: String,

    #[serde(rename = "@xsi:noNamespaceSchemaLocation", default)]
    pub xsi_schema_location: String,

    #[serde(rename = "@Version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(rename = "Vendor")]
    pub vendor: Vendor,

    #[serde(rename = "Descriptions")]
    pub descriptions: Descriptions,
}

impl Default for EtherCatInfo {
    fn default() -> Self {
        Self {
            xmlns_xsi: "http://www.w3.org/2001/XMLSchema-instance".into(),
            xsi_schema_location: "EtherCATInfo.xsd".into(),
            version: Some("1.6".into()),
            vendor: Vendor::default(),
            descriptions: Descriptions::default(),
        }
    }
}

/// Represents `<Vendor><Id>#x00000002</Id><Name>..</Name></Vendor>`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Vendor {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Name", default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<LocalizedName>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Descriptions {
    #[serde(rename = "Groups", default)]
    pub groups: Groups,

    #[serde(rename = "Devices", default)]
    pub devices: Devices,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Groups {
    #[serde(rename = "Group", default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<Group>,
}

/// Represents `<Group><Type>Couplers</Type><Name>..</Name></Group>`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Group {
    #[serde(rename = "Type")]
    pub group_type: String,

    #[serde(rename = "Name", default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<LocalizedName>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Devices {
    #[serde(rename = "Device", default)]
    pub device: Vec<Device>,
}
