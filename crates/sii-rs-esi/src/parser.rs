// crates/sii-rs-esi/src/parser.rs

use crate::error::EsiError;
use crate::model;
use crate::types::{
    data_type_code, EsiOptions, PDO_FLAG_FIXED, PDO_FLAG_MANDATORY, PDO_NO_SYNC_MANAGER,
};
use alloc::vec::Vec;
use log::{debug, warn};
use sii_rs::category::{
    CoeDetails, DistributedClock, FmmuCategory, FmmuUsage, General, Pdo, PdoCategory,
    PdoDirection, PdoEntry, PortType, SyncManager, SyncManagerCategory, SyncManagerType,
};
use sii_rs::header::{MailboxProtocols, MailboxRegion};
use sii_rs::types::PREAMBLE_CHECKSUM_SPAN;
use sii_rs::{Category, CategoryData, CategoryModel, Preamble, StdConfig};

/// Parses an ESI (EtherCATInfo) string slice into a category model.
///
/// The device selected by [`EsiOptions::device`] is mapped to the fixed
/// header and the Strings, General, FMMU, SyncManager, TxPDO, RxPDO and
/// DistributedClock categories, in that order. Categories without data in
/// the ESI are left out; General is always present.
///
/// # Errors
/// Returns an `EsiError` if the XML cannot be parsed, a numeric value is
/// malformed, or the device does not exist.
pub fn load_esi_from_str(
    xml_content: &str,
    options: &EsiOptions,
) -> Result<CategoryModel, EsiError> {
    // 1. Deserialize the raw XML string into our internal model.
    let info: model::EtherCatInfo = quick_xml::de::from_str(xml_content)?;

    // 2. Pick the requested device.
    let devices = &info.descriptions.devices.device;
    let device = devices
        .get(options.device)
        .ok_or(EsiError::DeviceNotFound {
            index: options.device,
            count: devices.len(),
        })?;

    // 3. The fixed header.
    let preamble = parse_preamble(device.eeprom.as_ref())?;
    let std_config = parse_std_config(&info.vendor, device, options)?;
    let mut model = CategoryModel::new(preamble, std_config);

    // 4. Categories. Strings are interned as they are met, so the Strings
    // category ends up in front.
    let general = parse_general(&mut model, device)?;
    model.append_category(Category::new(CategoryData::General(general)));

    if !device.fmmu.is_empty() {
        let fmmus = FmmuCategory::from_usages(device.fmmu.iter().map(|f| parse_fmmu_usage(f)));
        model.append_category(Category::new(CategoryData::Fmmu(fmmus)));
    }

    if !device.sm.is_empty() {
        let sync_managers = device
            .sm
            .iter()
            .enumerate()
            .map(|(id, sm)| parse_sync_manager(id, sm))
            .collect::<Result<Vec<_>, _>>()?;
        model.append_category(Category::new(CategoryData::SyncManager(
            SyncManagerCategory { sync_managers },
        )));
    }

    for (direction, pdos) in [
        (PdoDirection::Tx, &device.tx_pdo),
        (PdoDirection::Rx, &device.rx_pdo),
    ] {
        if pdos.is_empty() {
            continue;
        }
        let mut category = PdoCategory::new(direction);
        for pdo in pdos {
            category.pdos.push(parse_pdo(&mut model, pdo)?);
        }
        model.append_category(Category::new(CategoryData::Pdo(category)));
    }

    if let Some(dc) = device.dc.as_ref().map(parse_dc).transpose()?.flatten() {
        model.append_category(Category::new(CategoryData::DistributedClock(dc)));
    }

    debug!(
        "Mapped ESI device {} to {} categories",
        options.device,
        model.categories().len()
    );
    Ok(model)
}

// --- Fixed Header ---

/// Builds the preamble from `<ConfigData>`. Missing bytes are zero.
fn parse_preamble(eeprom: Option<&model::Eeprom>) -> Result<Preamble, EsiError> {
    let Some(config_data) = eeprom.and_then(|e| e.config_data.as_deref()) else {
        return Ok(Preamble::default());
    };
    let bytes = parse_hex_binary(config_data)?;
    if bytes.len() > PREAMBLE_CHECKSUM_SPAN {
        return Err(EsiError::InvalidAttributeFormat {
            attribute: "ConfigData",
        });
    }
    let mut data = [0u8; PREAMBLE_CHECKSUM_SPAN];
    data[..bytes.len()].copy_from_slice(&bytes);
    Ok(Preamble::from_data_bytes(&data))
}

fn parse_std_config(
    vendor: &model::Vendor,
    device: &model::Device,
    options: &EsiOptions,
) -> Result<StdConfig, EsiError> {
    let device_type = &device.device_type;
    let mut config = StdConfig {
        vendor_id: parse_esi_u32(&vendor.id, "Vendor/Id")?,
        product_id: parse_optional_u32(device_type.product_code.as_deref(), "ProductCode")?,
        revision_id: parse_optional_u32(device_type.revision_no.as_deref(), "RevisionNo")?,
        ..Default::default()
    };

    if let Some(eeprom) = &device.eeprom {
        if let Some(byte_size) = &eeprom.byte_size {
            let bytes = parse_esi_u32(byte_size, "ByteSize")?;
            config.eeprom_size = options.size_unit.raw_from_bytes(bytes as usize);
        }
        if let Some(boot_strap) = &eeprom.boot_strap {
            let bytes = parse_hex_binary(boot_strap)?;
            let [a, b, c, d, e, f, g, h] = bytes[..] else {
                return Err(EsiError::InvalidAttributeFormat {
                    attribute: "BootStrap",
                });
            };
            config.bootstrap_receive = MailboxRegion {
                offset: u16::from_le_bytes([a, b]),
                size: u16::from_le_bytes([c, d]),
            };
            config.bootstrap_send = MailboxRegion {
                offset: u16::from_le_bytes([e, f]),
                size: u16::from_le_bytes([g, h]),
            };
        }
    }

    // The standard mailboxes are the first mailbox SyncManagers.
    for (text, region) in [
        ("MBoxOut", &mut config.standard_receive),
        ("MBoxIn", &mut config.standard_send),
    ] {
        if let Some(sm) = device.sm.iter().find(|sm| sm.value.trim() == text) {
            *region = MailboxRegion {
                offset: parse_optional_u16(sm.start_address.as_deref(), "StartAddress")?,
                size: parse_optional_u16(sm.default_size.as_deref(), "DefaultSize")?,
            };
        }
    }

    if let Some(mailbox) = &device.mailbox {
        config.mailbox_protocols = MailboxProtocols {
            eoe: mailbox.eoe.is_some(),
            coe: mailbox.coe.is_some(),
            foe: mailbox.foe.is_some(),
            soe: mailbox.soe.is_some(),
            voe: mailbox.voe.is_some(),
            reserved: 0,
        };
    }

    Ok(config)
}

// --- Categories ---

fn parse_general(model: &mut CategoryModel, device: &model::Device) -> Result<General, EsiError> {
    let group_index = model.add_string(device.group_type.as_deref().unwrap_or("").trim())?;
    let order_index = model.add_string(device.device_type.value.trim())?;
    let name_index = model.add_string(preferred_name(&device.name))?;

    let mailbox = device.mailbox.as_ref();
    let coe = mailbox
        .and_then(|m| m.coe.as_ref())
        .map(|coe| CoeDetails {
            sdo: true,
            sdo_info: coe.sdo_info,
            pdo_assign: coe.pdo_assign,
            pdo_config: coe.pdo_config,
            upload_at_startup: coe.pdo_upload,
            sdo_complete_access: coe.complete_access,
        })
        .unwrap_or_default();

    let current_on_ebus = match device
        .info
        .as_ref()
        .and_then(|i| i.electrical.as_ref())
        .and_then(|e| e.ebus_current.as_deref())
    {
        Some(current) => current
            .trim()
            .parse::<i16>()
            .map_err(|_| EsiError::InvalidAttributeFormat {
                attribute: "EBusCurrent",
            })?,
        None => 0,
    };

    Ok(General {
        group_index,
        image_index: 0,
        order_index,
        name_index,
        coe,
        foe: mailbox.is_some_and(|m| m.foe.is_some()),
        eoe: mailbox.is_some_and(|m| m.eoe.is_some()),
        current_on_ebus,
        ports: parse_physics(device.physics.as_deref()),
        ..Default::default()
    })
}

/// Maps the `Physics` string to port media, one character per port.
fn parse_physics(physics: Option<&str>) -> [PortType; 4] {
    let mut ports = [PortType::NotUsed; 4];
    for (port, c) in ports.iter_mut().zip(physics.unwrap_or("").chars()) {
        *port = match c {
            'Y' => PortType::Mii,
            'K' => PortType::Ebus,
            _ => PortType::NotUsed,
        };
    }
    ports
}

fn parse_fmmu_usage(text: &str) -> FmmuUsage {
    match text.trim() {
        "Outputs" => FmmuUsage::Outputs,
        "Inputs" => FmmuUsage::Inputs,
        "MBoxState" => FmmuUsage::SyncManagerStatus,
        "" | "Unused" => FmmuUsage::Unused,
        other => {
            warn!("Unknown FMMU usage '{}', mapped as unused", other);
            FmmuUsage::Unused
        }
    }
}

fn parse_sync_manager(id: usize, sm: &model::Sm) -> Result<SyncManager, EsiError> {
    let kind = match sm.value.trim() {
        "MBoxOut" => SyncManagerType::MailboxOut,
        "MBoxIn" => SyncManagerType::MailboxIn,
        "Outputs" => SyncManagerType::ProcessOut,
        "Inputs" => SyncManagerType::ProcessIn,
        "" => SyncManagerType::Unused,
        other => {
            warn!("Unknown SyncManager type '{}' for SM{}, mapped as unused", other, id);
            SyncManagerType::Unused
        }
    };
    Ok(SyncManager {
        id,
        physical_address: parse_optional_u16(sm.start_address.as_deref(), "StartAddress")?,
        length: parse_optional_u16(sm.default_size.as_deref(), "DefaultSize")?,
        control: parse_optional_u8(sm.control_byte.as_deref(), "ControlByte")?,
        status: 0,
        enable: parse_optional_u8(sm.enable.as_deref(), "Enable")?,
        kind,
    })
}

fn parse_pdo(model: &mut CategoryModel, pdo: &model::Pdo) -> Result<Pdo, EsiError> {
    let index = parse_esi_u16(&pdo.index, "Pdo/Index")?;
    let sync_manager = match pdo.sm.as_deref() {
        Some(sm) => parse_esi_u8(sm, "Sm")?,
        None => PDO_NO_SYNC_MANAGER,
    };
    let name_index = model.add_string(preferred_name(&pdo.name))?;

    let mut flags = 0;
    if pdo.mandatory {
        flags |= PDO_FLAG_MANDATORY;
    }
    if pdo.fixed {
        flags |= PDO_FLAG_FIXED;
    }

    let mut entries = Vec::with_capacity(pdo.entry.len());
    for entry in &pdo.entry {
        entries.push(parse_entry(model, entry)?);
    }

    Ok(Pdo {
        index,
        sync_manager,
        dc_sync: 0,
        name_index,
        flags,
        entries,
    })
}

fn parse_entry(model: &mut CategoryModel, entry: &model::Entry) -> Result<PdoEntry, EsiError> {
    let data_type = match entry.data_type.as_deref() {
        Some(name) => data_type_code(name).unwrap_or_else(|| {
            warn!("Unknown data type '{}' in PDO entry {}", name, entry.index);
            0
        }),
        None => 0,
    };
    Ok(PdoEntry {
        index: parse_esi_u16(&entry.index, "Entry/Index")?,
        subindex: parse_optional_u8(entry.sub_index.as_deref(), "Entry/SubIndex")?,
        name_index: model.add_string(preferred_name(&entry.name))?,
        data_type,
        bit_length: parse_esi_u8(&entry.bit_len, "BitLen")?,
        flags: 0,
    })
}

/// Maps the first operation mode that activates anything, or the first one
/// if none does. Returns `None` for a `<Dc>` without operation modes.
fn parse_dc(dc: &model::Dc) -> Result<Option<DistributedClock>, EsiError> {
    let mut modes = Vec::with_capacity(dc.op_mode.len());
    for op_mode in &dc.op_mode {
        let activation =
            parse_optional_u16(Some(op_mode.assign_activate.as_str()), "AssignActivate")?;
        modes.push((activation, op_mode));
    }
    let Some((activation, op_mode)) = modes
        .iter()
        .find(|(activation, _)| *activation != 0)
        .or_else(|| modes.first())
    else {
        return Ok(None);
    };

    let mut clock = DistributedClock {
        sync0_cycle_time: parse_cycle_time(op_mode.cycle_time_sync0.as_ref(), "CycleTimeSync0")?,
        sync1_cycle_time: parse_cycle_time(op_mode.cycle_time_sync1.as_ref(), "CycleTimeSync1")?,
        ..Default::default()
    };
    clock.set_activation(*activation);
    debug!("Using DC operation mode '{}'", op_mode.name.trim());
    Ok(Some(clock))
}

fn parse_cycle_time(
    time: Option<&model::CycleTime>,
    attribute: &'static str,
) -> Result<u32, EsiError> {
    match time {
        Some(time) => parse_optional_u32(Some(time.value.as_str()), attribute),
        None => Ok(0),
    }
}

/// The English name if one is tagged, otherwise the first one.
fn preferred_name(names: &[model::LocalizedName]) -> &str {
    names
        .iter()
        .find(|n| n.lc_id.as_deref() == Some("1033"))
        .or_else(|| names.first())
        .map(|n| n.value.trim())
        .unwrap_or("")
}

// --- Helper Functions ---

/// Parses an ESI number: `#x` or `0x` prefixed hex, decimal otherwise.
fn parse_esi_u32(s: &str, attribute: &'static str) -> Result<u32, EsiError> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("#x")
        .or_else(|| trimmed.strip_prefix("#X"))
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|_| EsiError::InvalidAttributeFormat { attribute })
}

/// Parses an ESI number into a u16.
fn parse_esi_u16(s: &str, attribute: &'static str) -> Result<u16, EsiError> {
    u16::try_from(parse_esi_u32(s, attribute)?)
        .map_err(|_| EsiError::InvalidAttributeFormat { attribute })
}

/// Parses an ESI number into a u8.
fn parse_esi_u8(s: &str, attribute: &'static str) -> Result<u8, EsiError> {
    u8::try_from(parse_esi_u32(s, attribute)?)
        .map_err(|_| EsiError::InvalidAttributeFormat { attribute })
}

/// An absent or empty value reads as zero.
fn parse_optional_u32(s: Option<&str>, attribute: &'static str) -> Result<u32, EsiError> {
    match s.map(str::trim) {
        Some(value) if !value.is_empty() => parse_esi_u32(value, attribute),
        _ => Ok(0),
    }
}

fn parse_optional_u16(s: Option<&str>, attribute: &'static str) -> Result<u16, EsiError> {
    u16::try_from(parse_optional_u32(s, attribute)?)
        .map_err(|_| EsiError::InvalidAttributeFormat { attribute })
}

fn parse_optional_u8(s: Option<&str>, attribute: &'static str) -> Result<u8, EsiError> {
    u8::try_from(parse_optional_u32(s, attribute)?)
        .map_err(|_| EsiError::InvalidAttributeFormat { attribute })
}

/// Parses a hexBinary value, ignoring whitespace and an optional `#x` prefix.
fn parse_hex_binary(s: &str) -> Result<Vec<u8>, EsiError> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("#x").unwrap_or(trimmed);
    let digits: Vec<u8> = trimmed
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(EsiError::HexParsing(hex::FromHexError::OddLength));
    }
    hex::decode(digits).map_err(EsiError::HexParsing)
}
