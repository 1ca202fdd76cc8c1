// crates/sii-rs-cli/src/print.rs

//! Human-readable dump of a model and its findings.

use std::fmt::{self, Write};

use sii_rs::category::{
    DistributedClock, FmmuCategory, General, PdoCategory, PdoDirection, PortType, StringsCategory,
    SyncManagerCategory,
};
use sii_rs::{CategoryData, CategoryModel, EepromSizeUnit, Finding};
use sii_rs_esi::data_type_name;

/// Renders the fixed header and every category in model order.
pub fn render_model(model: &CategoryModel, unit: EepromSizeUnit) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_preamble(&mut out, model)?;
    write_std_config(&mut out, model, unit)?;

    for (index, category) in model.categories().iter().enumerate() {
        writeln!(
            out,
            "\n== Category {}: {} ({} words{}) ==",
            index,
            category.kind(),
            category.size_words(),
            if category.vendor_specific { ", vendor specific" } else { "" }
        )?;
        match &category.data {
            CategoryData::Strings(strings) => write_strings(&mut out, strings)?,
            CategoryData::General(general) => write_general(&mut out, model, general)?,
            CategoryData::Fmmu(fmmus) => write_fmmus(&mut out, fmmus)?,
            CategoryData::SyncManager(sms) => write_sync_managers(&mut out, sms)?,
            CategoryData::Pdo(pdos) => write_pdos(&mut out, model, pdos)?,
            CategoryData::DistributedClock(dc) => write_dc(&mut out, dc)?,
            CategoryData::Opaque { payload, .. } => write_hex_dump(&mut out, payload)?,
        }
    }

    if !model.trailer().is_empty() {
        writeln!(out, "\n== Trailer ({} bytes) ==", model.trailer().len())?;
        write_hex_dump(&mut out, model.trailer())?;
    }
    Ok(out)
}

/// One line per finding, or a note that there are none.
pub fn render_findings(findings: &[Finding]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if findings.is_empty() {
        writeln!(out, "No findings.")?;
    }
    for finding in findings {
        writeln!(out, "{finding}")?;
    }
    Ok(out)
}

// --- Fixed Header ---

fn write_preamble(out: &mut String, model: &CategoryModel) -> fmt::Result {
    let preamble = model.preamble();
    writeln!(out, "== Preamble ==")?;
    writeln!(out, "  PDI control:      {:#06x}", preamble.pdi_control)?;
    writeln!(out, "  PDI config:       {:#06x}", preamble.pdi_config)?;
    writeln!(
        out,
        "  Sync impulse len: {} ({} ns)",
        preamble.sync_impulse_len,
        u32::from(preamble.sync_impulse_len) * 10
    )?;
    writeln!(out, "  PDI config 2:     {:#06x}", preamble.pdi_config2)?;
    writeln!(out, "  Station alias:    {:#06x}", preamble.station_alias)?;
    match preamble.stored_checksum {
        Some(stored) => writeln!(
            out,
            "  Checksum:         {:#06x} (computed {:#04x})",
            stored,
            preamble.computed_checksum()
        ),
        None => writeln!(out, "  Checksum:         computed {:#04x}", preamble.computed_checksum()),
    }
}

fn write_std_config(out: &mut String, model: &CategoryModel, unit: EepromSizeUnit) -> fmt::Result {
    let config = model.std_config();
    writeln!(out, "\n== Station Configuration ==")?;
    writeln!(out, "  Vendor ID:        {:#010x}", config.vendor_id)?;
    writeln!(out, "  Product code:     {:#010x}", config.product_id)?;
    writeln!(out, "  Revision:         {:#010x}", config.revision_id)?;
    writeln!(out, "  Serial number:    {:#010x}", config.serial)?;
    for (kind, region) in config.mailboxes() {
        writeln!(
            out,
            "  Mailbox {:<18} offset {:#06x}, size {}",
            format!("{kind}:"),
            region.offset,
            region.size
        )?;
    }

    let protocols = config.mailbox_protocols;
    let names: Vec<&str> = [
        (protocols.eoe, "EoE"),
        (protocols.coe, "CoE"),
        (protocols.foe, "FoE"),
        (protocols.soe, "SoE"),
        (protocols.voe, "VoE"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    writeln!(
        out,
        "  Mailbox protocols: {}",
        if names.is_empty() { "none".to_string() } else { names.join(", ") }
    )?;

    match config.eeprom_capacity(unit) {
        Some(bytes) => writeln!(
            out,
            "  EEPROM size:      {:#06x} ({} bytes)",
            config.eeprom_size, bytes
        )?,
        None => writeln!(out, "  EEPROM size:      not declared")?,
    }
    writeln!(out, "  Version:          {}", config.version)
}

// --- Categories ---

fn write_strings(out: &mut String, strings: &StringsCategory) -> fmt::Result {
    for (i, text) in strings.strings.iter().enumerate() {
        writeln!(out, "  [{:3}] {}", i + 1, text)?;
    }
    Ok(())
}

fn write_general(out: &mut String, model: &CategoryModel, general: &General) -> fmt::Result {
    let text = |index: u8| model.string_at(index).unwrap_or("");
    writeln!(out, "  Group:   [{}] {}", general.group_index, text(general.group_index))?;
    writeln!(out, "  Image:   [{}] {}", general.image_index, text(general.image_index))?;
    writeln!(out, "  Order:   [{}] {}", general.order_index, text(general.order_index))?;
    writeln!(out, "  Name:    [{}] {}", general.name_index, text(general.name_index))?;

    let coe = general.coe;
    writeln!(
        out,
        "  CoE:     sdo={} sdo_info={} pdo_assign={} pdo_config={} upload={} complete_access={}",
        coe.sdo,
        coe.sdo_info,
        coe.pdo_assign,
        coe.pdo_config,
        coe.upload_at_startup,
        coe.sdo_complete_access
    )?;
    writeln!(out, "  FoE: {}  EoE: {}", general.foe, general.eoe)?;
    writeln!(out, "  SafeOp: {}  NotLRW: {}", general.safe_op, general.not_lrw)?;
    writeln!(out, "  E-bus current: {} mA", general.current_on_ebus)?;

    let ports: Vec<String> = general.ports.iter().map(port_name).collect();
    writeln!(out, "  Ports:   {}", ports.join(", "))
}

fn port_name(port: &PortType) -> String {
    match port {
        PortType::NotUsed => "not used".into(),
        PortType::Mii => "MII".into(),
        PortType::Reserved => "reserved".into(),
        PortType::Ebus => "E-bus".into(),
        PortType::Other(value) => format!("{value:#03x}"),
    }
}

fn write_fmmus(out: &mut String, fmmus: &FmmuCategory) -> fmt::Result {
    for fmmu in &fmmus.fmmus {
        writeln!(out, "  FMMU{}: {:?}", fmmu.id, fmmu.usage)?;
    }
    Ok(())
}

fn write_sync_managers(out: &mut String, sms: &SyncManagerCategory) -> fmt::Result {
    for sm in &sms.sync_managers {
        writeln!(
            out,
            "  SM{}: {:?} at {:#06x}, length {}, control {:#04x}, status {:#04x}, enable {:#04x}",
            sm.id, sm.kind, sm.physical_address, sm.length, sm.control, sm.status, sm.enable
        )?;
    }
    Ok(())
}

fn write_pdos(out: &mut String, model: &CategoryModel, pdos: &PdoCategory) -> fmt::Result {
    let direction = match pdos.direction {
        PdoDirection::Tx => "TxPDO",
        PdoDirection::Rx => "RxPDO",
    };
    for pdo in &pdos.pdos {
        writeln!(
            out,
            "  {} {:#06x} \"{}\": SM {}, DC sync {}, flags {:#06x}, {} bits",
            direction,
            pdo.index,
            model.string_at(pdo.name_index).unwrap_or(""),
            pdo.sync_manager,
            pdo.dc_sync,
            pdo.flags,
            pdo.bit_length()
        )?;
        for entry in &pdo.entries {
            writeln!(
                out,
                "    {:#06x}:{:02x} {:>3} bit {:<14} \"{}\"",
                entry.index,
                entry.subindex,
                entry.bit_length,
                data_type_name(entry.data_type).unwrap_or("-"),
                model.string_at(entry.name_index).unwrap_or("")
            )?;
        }
    }
    Ok(())
}

fn write_dc(out: &mut String, dc: &DistributedClock) -> fmt::Result {
    writeln!(
        out,
        "  Activation: {:#06x} (cyclic {}, SYNC0 {}, SYNC1 {})",
        dc.activation(),
        dc.cyclic_op_enabled,
        dc.sync0_active,
        dc.sync1_active
    )?;
    writeln!(out, "  Sync pulse: {}", dc.sync_pulse)?;
    writeln!(out, "  Cyclic start time: {} ns", dc.cyclic_op_start_time)?;
    writeln!(out, "  SYNC0 cycle time:  {} ns", dc.sync0_cycle_time)?;
    writeln!(out, "  SYNC1 cycle time:  {} ns", dc.sync1_cycle_time)?;
    for (name, latch) in [("Latch0", &dc.latch0), ("Latch1", &dc.latch1)] {
        writeln!(
            out,
            "  {}: edges +{} -{}, events +{} -{}",
            name,
            latch.positive_edge,
            latch.negative_edge,
            latch.positive_event,
            latch.negative_event
        )?;
    }
    Ok(())
}

fn write_hex_dump(out: &mut String, bytes: &[u8]) -> fmt::Result {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        write!(out, "  {:04x}:", row * 16)?;
        for byte in chunk {
            write!(out, " {byte:02x}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sii_rs::category::{Pdo, PdoEntry};
    use sii_rs::{Category, FindingCode, Location, Preamble, Severity, StdConfig};

    fn sample_model() -> CategoryModel {
        let mut model = CategoryModel::new(Preamble::default(), StdConfig::default());
        let name = model.add_string("Status").unwrap();
        let mut pdos = PdoCategory::new(PdoDirection::Tx);
        pdos.pdos.push(Pdo {
            index: 0x1A00,
            sync_manager: 3,
            dc_sync: 0,
            name_index: name,
            flags: 0,
            entries: vec![PdoEntry {
                index: 0x6000,
                subindex: 1,
                name_index: name,
                data_type: 0x07,
                bit_length: 32,
                flags: 0,
            }],
        });
        model.append_category(Category::new(CategoryData::Pdo(pdos)));
        model.append_category(Category::opaque(0x0123, vec![0xAB, 0xCD]));
        model
    }

    #[test]
    fn test_render_model() {
        let text = render_model(&sample_model(), EepromSizeUnit::Words).unwrap();
        assert!(text.starts_with("== Preamble =="));
        assert!(text.contains("EEPROM size:      not declared"));
        assert!(text.contains("Mailbox protocols: none"));
        assert!(text.contains("[  1] Status"));
        assert!(text.contains("TxPDO 0x1a00 \"Status\": SM 3"));
        assert!(text.contains("0x6000:01  32 bit UDINT"));
        assert!(text.contains("  0000: ab cd"));
    }

    #[test]
    fn test_render_findings() {
        assert_eq!(render_findings(&[]).unwrap(), "No findings.\n");

        let finding = Finding::new(
            Severity::Warning,
            FindingCode::MissingEndMarker,
            Location::at_offset(0x80),
        );
        let text = render_findings(&[finding.clone()]).unwrap();
        assert_eq!(text, format!("{finding}\n"));
    }
}
