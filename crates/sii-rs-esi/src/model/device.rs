// crates/sii-rs-esi/src/model/device.rs

//! Contains model structs related to `<Device>`.
//! (Schema: `EtherCATInfo.xsd`, type `DeviceType`)

use super::common::{is_false, LocalizedName, Protocol};
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Represents one `<Device>` inside `<Devices>`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Device {
    /// One character per port: `Y` for MII, `K` for E-bus, blank for unused.
    #[serde(rename = "@Physics", default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<String>,

    #[serde(rename = "Type")]
    pub device_type: DeviceType,

    #[serde(rename = "Name", default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<LocalizedName>,

    #[serde(rename = "Info", default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    #[serde(rename = "GroupType", default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,

    /// FMMU usage texts: `Outputs`, `Inputs`, `MBoxState`.
    #[serde(rename = "Fmmu", default, skip_serializing_if = "Vec::is_empty")]
    pub fmmu: Vec<String>,

    #[serde(rename = "Sm", default, skip_serializing_if = "Vec::is_empty")]
    pub sm: Vec<Sm>,

    #[serde(rename = "RxPdo", default, skip_serializing_if = "Vec::is_empty")]
    pub rx_pdo: Vec<Pdo>,

    #[serde(rename = "TxPdo", default, skip_serializing_if = "Vec::is_empty")]
    pub tx_pdo: Vec<Pdo>,

    #[serde(rename = "Mailbox", default, skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<Mailbox>,

    #[serde(rename = "Dc", default, skip_serializing_if = "Option::is_none")]
    pub dc: Option<Dc>,

    #[serde(rename = "Eeprom", default, skip_serializing_if = "Option::is_none")]
    pub eeprom: Option<Eeprom>,
}

/// Represents `<Type ProductCode="#x..." RevisionNo="#x...">OrderNumber</Type>`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DeviceType {
    #[serde(rename = "@ProductCode", default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    #[serde(rename = "@RevisionNo", default, skip_serializing_if = "Option::is_none")]
    pub revision_no: Option<String>,

    #[serde(rename = "$value", default)]
    pub value: String,
}

/// Represents `<Info>`; only the electrical data is mapped.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Info {
    #[serde(rename = "Electrical", default, skip_serializing_if = "Option::is_none")]
    pub electrical: Option<Electrical>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Electrical {
    /// Current consumption on the E-bus in mA.
    #[serde(rename = "EBusCurrent", default, skip_serializing_if = "Option::is_none")]
    pub ebus_current: Option<String>,
}

/// Represents `<Sm StartAddress=".." ControlByte=".." DefaultSize=".." Enable="..">MBoxOut</Sm>`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Sm {
    #[serde(rename = "@StartAddress", default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,

    #[serde(rename = "@ControlByte", default, skip_serializing_if = "Option::is_none")]
    pub control_byte: Option<String>,

    #[serde(rename = "@DefaultSize", default, skip_serializing_if = "Option::is_none")]
    pub default_size: Option<String>,

    #[serde(rename = "@Enable", default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<String>,

    /// `MBoxOut`, `MBoxIn`, `Outputs` or `Inputs`.
    #[serde(rename = "$value", default)]
    pub value: String,
}

/// Represents `<RxPdo>` and `<TxPdo>`.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Pdo {
    #[serde(rename = "@Fixed", default, skip_serializing_if = "is_false")]
    pub fixed: bool,

    #[serde(rename = "@Mandatory", default, skip_serializing_if = "is_false")]
    pub mandatory: bool,

    /// Assigned SyncManager; absent for PDOs without a default assignment.
    #[serde(rename = "@Sm", default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<String>,

    #[serde(rename = "Index")]
    pub index: String,

    #[serde(rename = "Name", default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<LocalizedName>,

    #[serde(rename = "Entry", default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<Entry>,
}

/// Represents one `<Entry>` of a PDO. Padding entries have index 0.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Entry {
    #[serde(rename = "Index")]
    pub index: String,

    #[serde(rename = "SubIndex", default, skip_serializing_if = "Option::is_none")]
    pub sub_index: Option<String>,

    #[serde(rename = "BitLen")]
    pub bit_len: String,

    #[serde(rename = "Name", default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<LocalizedName>,

    #[serde(rename = "DataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// Represents `<Mailbox>` with its protocol children.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Mailbox {
    #[serde(rename = "@DataLinkLayer", default, skip_serializing_if = "is_false")]
    pub data_link_layer: bool,

    #[serde(rename = "EoE", default, skip_serializing_if = "Option::is_none")]
    pub eoe: Option<Protocol>,

    #[serde(rename = "CoE", default, skip_serializing_if = "Option::is_none")]
    pub coe: Option<Coe>,

    #[serde(rename = "FoE", default, skip_serializing_if = "Option::is_none")]
    pub foe: Option<Protocol>,

    #[serde(rename = "SoE", default, skip_serializing_if = "Option::is_none")]
    pub soe: Option<Protocol>,

    #[serde(rename = "VoE", default, skip_serializing_if = "Option::is_none")]
    pub voe: Option<Protocol>,
}

/// Represents `<CoE>` and the CoE details mirrored in the General category.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Coe {
    #[serde(rename = "@SdoInfo", default, skip_serializing_if = "is_false")]
    pub sdo_info: bool,

    #[serde(rename = "@PdoAssign", default, skip_serializing_if = "is_false")]
    pub pdo_assign: bool,

    #[serde(rename = "@PdoConfig", default, skip_serializing_if = "is_false")]
    pub pdo_config: bool,

    #[serde(rename = "@PdoUpload", default, skip_serializing_if = "is_false")]
    pub pdo_upload: bool,

    #[serde(rename = "@CompleteAccess", default, skip_serializing_if = "is_false")]
    pub complete_access: bool,
}

/// Represents `<Dc>` with its operation modes.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Dc {
    #[serde(rename = "OpMode", default, skip_serializing_if = "Vec::is_empty")]
    pub op_mode: Vec<OpMode>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct OpMode {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Desc", default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(rename = "AssignActivate", default)]
    pub assign_activate: String,

    #[serde(rename = "CycleTimeSync0", default, skip_serializing_if = "Option::is_none")]
    pub cycle_time_sync0: Option<CycleTime>,

    #[serde(rename = "CycleTimeSync1", default, skip_serializing_if = "Option::is_none")]
    pub cycle_time_sync1: Option<CycleTime>,
}

/// A cycle time in ns. A `Factor` attribute scales the master's cycle time
/// instead and is kept only for information.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CycleTime {
    #[serde(rename = "@Factor", default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<String>,

    #[serde(rename = "$value", default)]
    pub value: String,
}

/// Represents `<Eeprom>` in its `ByteSize`/`ConfigData`/`BootStrap` form.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Eeprom {
    #[serde(rename = "ByteSize", default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<String>,

    /// hexBinary of the first preamble words.
    #[serde(rename = "ConfigData", default, skip_serializing_if = "Option::is_none")]
    pub config_data: Option<String>,

    /// hexBinary of the bootstrap mailbox offsets and sizes.
    #[serde(rename = "BootStrap", default, skip_serializing_if = "Option::is_none")]
    pub boot_strap: Option<String>,
}
