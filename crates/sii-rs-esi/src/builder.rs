// crates/sii-rs-esi/src/builder.rs

use crate::error::EsiError;
use crate::model;
use crate::types::{
    data_type_name, EsiOptions, PDO_FLAG_FIXED, PDO_FLAG_MANDATORY, PDO_NO_SYNC_MANAGER,
};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;
use serde::Serialize;
use sii_rs::category::{
    FmmuUsage, General, Pdo, PdoDirection, PdoEntry, PortType, SyncManager, SyncManagerType,
};
use sii_rs::CategoryModel;

/// Serializes a category model into an ESI (EtherCATInfo) XML `String`
/// describing a single device.
///
/// String indices are resolved through the model's Strings category.
/// Reserved bits, the serial number and category payloads without an ESI
/// counterpart are not represented.
///
/// # Errors
/// Returns an `EsiError` if serialization fails.
pub fn save_esi_to_string(model: &CategoryModel, options: &EsiOptions) -> Result<String, EsiError> {
    // 1. Build the device description.
    let device = build_device(model, options);

    // 2. The group the device refers to, if any.
    let groups = match device.group_type.as_deref() {
        Some(group) => vec![model::Group {
            group_type: group.into(),
            name: vec![model::LocalizedName::new(group)],
        }],
        None => Vec::new(),
    };

    // 3. Wrap in the root element.
    let info = model::EtherCatInfo {
        vendor: model::Vendor {
            id: format_hex_u32(model.std_config().vendor_id),
            name: options
                .vendor_name
                .as_deref()
                .map(|name| vec![model::LocalizedName::new(name)])
                .unwrap_or_default(),
        },
        descriptions: model::Descriptions {
            groups: model::Groups { group: groups },
            devices: model::Devices {
                device: vec![device],
            },
        },
        ..Default::default()
    };

    // 4. Serialize.
    let mut buffer = String::new();
    // The XML declaration is not emitted by the serializer.
    write!(&mut buffer, "{}", "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;

    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.indent(' ', 2);

    info.serialize(serializer)?;

    Ok(buffer)
}

fn build_device(model: &CategoryModel, options: &EsiOptions) -> model::Device {
    let text = |index: u8| model.string_at(index).unwrap_or("");
    let config = model.std_config();
    let general = model.general();
    let name = general.map(|g| text(g.name_index)).unwrap_or("");
    let group = general.map(|g| text(g.group_index)).unwrap_or("");

    model::Device {
        physics: general.and_then(|g| build_physics(&g.ports)),
        device_type: model::DeviceType {
            product_code: Some(format_hex_u32(config.product_id)),
            revision_no: Some(format_hex_u32(config.revision_id)),
            value: general.map(|g| text(g.order_index)).unwrap_or("").into(),
        },
        name: localized(name),
        info: general.filter(|g| g.current_on_ebus != 0).map(|g| model::Info {
            electrical: Some(model::Electrical {
                ebus_current: Some(g.current_on_ebus.to_string()),
            }),
        }),
        group_type: (!group.is_empty()).then(|| group.into()),
        fmmu: build_fmmus(model),
        sm: model
            .sync_managers()
            .map(|sms| sms.sync_managers.iter().map(build_sync_manager).collect())
            .unwrap_or_default(),
        rx_pdo: build_pdos(model, PdoDirection::Rx),
        tx_pdo: build_pdos(model, PdoDirection::Tx),
        mailbox: build_mailbox(model, general),
        dc: model.distributed_clock().map(|dc| model::Dc {
            op_mode: vec![model::OpMode {
                name: "DC".into(),
                desc: Some("DC-Synchron".into()),
                assign_activate: format!("#x{:04X}", dc.activation()),
                cycle_time_sync0: Some(cycle_time(dc.sync0_cycle_time)),
                cycle_time_sync1: Some(cycle_time(dc.sync1_cycle_time)),
            }],
        }),
        eeprom: Some(build_eeprom(model, options)),
    }
}

/// One character per port, trailing unused ports dropped.
fn build_physics(ports: &[PortType; 4]) -> Option<String> {
    let physics: String = ports
        .iter()
        .map(|port| match port {
            PortType::Mii => 'Y',
            PortType::Ebus => 'K',
            _ => ' ',
        })
        .collect();
    let physics = physics.trim_end();
    (!physics.is_empty()).then(|| physics.into())
}

/// Trailing unused FMMUs (including a pad entry) are dropped.
fn build_fmmus(model: &CategoryModel) -> Vec<String> {
    let Some(category) = model.fmmus() else {
        return Vec::new();
    };
    let used = category
        .fmmus
        .iter()
        .rposition(|f| f.usage != FmmuUsage::Unused)
        .map_or(0, |last| last + 1);
    category.fmmus[..used]
        .iter()
        .map(|f| {
            match f.usage {
                FmmuUsage::Outputs => "Outputs",
                FmmuUsage::Inputs => "Inputs",
                FmmuUsage::SyncManagerStatus => "MBoxState",
                FmmuUsage::Unused | FmmuUsage::Other(_) => "Unused",
            }
            .into()
        })
        .collect()
}

fn build_sync_manager(sm: &SyncManager) -> model::Sm {
    let kind = match sm.kind {
        SyncManagerType::MailboxOut => "MBoxOut",
        SyncManagerType::MailboxIn => "MBoxIn",
        SyncManagerType::ProcessOut => "Outputs",
        SyncManagerType::ProcessIn => "Inputs",
        SyncManagerType::Unused | SyncManagerType::Other(_) => "",
    };
    model::Sm {
        start_address: Some(format_hex_u16(sm.physical_address)),
        control_byte: Some(format!("#x{:02X}", sm.control)),
        default_size: Some(sm.length.to_string()),
        enable: Some(sm.enable.to_string()),
        value: kind.into(),
    }
}

fn build_pdos(model: &CategoryModel, direction: PdoDirection) -> Vec<model::Pdo> {
    model
        .pdos(direction)
        .flat_map(|category| category.pdos.iter())
        .map(|pdo| build_pdo(model, pdo))
        .collect()
}

fn build_pdo(model: &CategoryModel, pdo: &Pdo) -> model::Pdo {
    model::Pdo {
        fixed: pdo.flags & PDO_FLAG_FIXED != 0,
        mandatory: pdo.flags & PDO_FLAG_MANDATORY != 0,
        sm: (pdo.sync_manager != PDO_NO_SYNC_MANAGER).then(|| pdo.sync_manager.to_string()),
        index: format_hex_u16(pdo.index),
        name: localized(model.string_at(pdo.name_index).unwrap_or("")),
        entry: pdo.entries.iter().map(|e| build_entry(model, e)).collect(),
    }
}

fn build_entry(model: &CategoryModel, entry: &PdoEntry) -> model::Entry {
    model::Entry {
        index: format_hex_u16(entry.index),
        sub_index: Some(entry.subindex.to_string()),
        bit_len: entry.bit_length.to_string(),
        name: localized(model.string_at(entry.name_index).unwrap_or("")),
        data_type: data_type_name(entry.data_type).map(String::from),
    }
}

fn build_mailbox(model: &CategoryModel, general: Option<&General>) -> Option<model::Mailbox> {
    let protocols = model.std_config().mailbox_protocols;
    if !protocols.any() {
        return None;
    }
    let coe = general.map(|g| g.coe).unwrap_or_default();
    Some(model::Mailbox {
        data_link_layer: false,
        eoe: protocols.eoe.then(model::Protocol::default),
        coe: protocols.coe.then(|| model::Coe {
            sdo_info: coe.sdo_info,
            pdo_assign: coe.pdo_assign,
            pdo_config: coe.pdo_config,
            pdo_upload: coe.upload_at_startup,
            complete_access: coe.sdo_complete_access,
        }),
        foe: protocols.foe.then(model::Protocol::default),
        soe: protocols.soe.then(model::Protocol::default),
        voe: protocols.voe.then(model::Protocol::default),
    })
}

fn build_eeprom(model: &CategoryModel, options: &EsiOptions) -> model::Eeprom {
    let config = model.std_config();
    let mut boot_strap = Vec::with_capacity(8);
    for region in [config.bootstrap_receive, config.bootstrap_send] {
        boot_strap.extend_from_slice(&region.offset.to_le_bytes());
        boot_strap.extend_from_slice(&region.size.to_le_bytes());
    }
    model::Eeprom {
        byte_size: config
            .eeprom_capacity(options.size_unit)
            .map(|bytes| bytes.to_string()),
        config_data: Some(hex::encode_upper(model.preamble().data_bytes())),
        boot_strap: boot_strap
            .iter()
            .any(|b| *b != 0)
            .then(|| hex::encode_upper(&boot_strap)),
    }
}

// --- Helper Functions ---

fn localized(text: &str) -> Vec<model::LocalizedName> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![model::LocalizedName::new(text)]
    }
}

fn cycle_time(ns: u32) -> model::CycleTime {
    model::CycleTime {
        factor: None,
        value: ns.to_string(),
    }
}

fn format_hex_u32(val: u32) -> String {
    format!("#x{:08X}", val)
}

fn format_hex_u16(val: u16) -> String {
    format!("#x{:04X}", val)
}
