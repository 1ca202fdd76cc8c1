// crates/sii-rs-esi/tests/parsing.rs

use sii_rs::category::{FmmuUsage, PdoDirection, PortType, SyncManagerType};
use sii_rs::header::MailboxRegion;
use sii_rs::{CategoryModel, CategoryType};
use sii_rs_esi::{load_esi_from_str, EsiError, EsiOptions};
use std::fs;
use std::path::PathBuf;

/// Helper function to load a test file from the `tests/data/` directory.
fn load_test_file(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(name);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test file {:?}: {}", path, e))
}

fn load(name: &str, device: usize) -> CategoryModel {
    let xml = load_test_file(name);
    load_esi_from_str(&xml, &EsiOptions::default().with_device(device))
        .unwrap_or_else(|e| panic!("Failed to map {} device {}: {}", name, device, e))
}

#[test]
fn test_simple_terminal_identity() {
    let model = load("EL1002.xml", 0);

    let config = model.std_config();
    assert_eq!(config.vendor_id, 2);
    assert_eq!(config.product_id, 0x03EA_3052);
    assert_eq!(config.revision_id, 0x0010_0000);
    assert_eq!(config.eeprom_size, 1024, "2048 bytes are 1024 words");
    assert!(!config.mailbox_protocols.any());
    assert_eq!(model.preamble().pdi_control, 0x0001);

    let general = model.general().expect("General is always mapped");
    assert_eq!(model.string_at(general.group_index), Some("DigIn"));
    assert_eq!(model.string_at(general.order_index), Some("EL1002"));
    // The English name wins over the German one.
    assert_eq!(
        model.string_at(general.name_index),
        Some("EL1002 2Ch. Dig. Input 24V, 3ms")
    );
    assert_eq!(general.current_on_ebus, 90);
    assert_eq!(
        general.ports,
        [PortType::Ebus, PortType::Ebus, PortType::NotUsed, PortType::NotUsed]
    );
    assert!(!general.coe.sdo);
}

#[test]
fn test_simple_terminal_categories() {
    let model = load("EL1002.xml", 0);

    let kinds: Vec<_> = model.categories().iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        [
            CategoryType::Strings,
            CategoryType::General,
            CategoryType::Fmmu,
            CategoryType::SyncManager,
            CategoryType::TxPdo,
        ]
    );

    assert_eq!(model.fmmus().unwrap().fmmus[0].usage, FmmuUsage::Inputs);
    let sm = &model.sync_managers().unwrap().sync_managers[0];
    assert_eq!(sm.kind, SyncManagerType::ProcessIn);
    assert_eq!(sm.enable, 1);

    let tx: Vec<_> = model.pdos(PdoDirection::Tx).flat_map(|c| c.pdos.iter()).collect();
    assert_eq!(tx.len(), 2);
    assert_eq!(tx[0].index, 0x1A00);
    assert_eq!(tx[0].sync_manager, 0);
    assert_eq!(tx[0].flags, 0x0011);
    assert_eq!(model.string_at(tx[0].name_index), Some("Channel 1"));
    assert_eq!(tx[0].entries[0].index, 0x6000);
    assert_eq!(tx[0].entries[0].data_type, 0x01);

    // Both "Input" entries share one string; padding has no name.
    assert_eq!(tx[0].entries[0].name_index, tx[1].entries[0].name_index);
    let padding = &tx[1].entries[1];
    assert_eq!((padding.index, padding.subindex, padding.bit_length), (0, 0, 6));
    assert_eq!(padding.name_index, 0);
    assert_eq!(padding.data_type, 0);
    assert_eq!(tx[1].bit_length(), 7);
}

#[test]
fn test_select_device_with_mailbox_and_dc() {
    let model = load("EL6751.xml", 1);
    assert_eq!(model.categories().len(), 7);

    let config = model.std_config();
    assert_eq!(config.product_id, 0x1A5F_3052);
    assert!(config.mailbox_protocols.coe && config.mailbox_protocols.foe);
    assert!(!config.mailbox_protocols.eoe);
    assert_eq!(
        config.standard_receive,
        MailboxRegion {
            offset: 0x1800,
            size: 1024
        }
    );
    assert_eq!(config.standard_send.offset, 0x1C00);
    assert_eq!(
        config.bootstrap_send,
        MailboxRegion {
            offset: 0x1BF4,
            size: 0x00F4
        }
    );
    assert_eq!(model.preamble().sync_impulse_len, 1000);

    let general = model.general().unwrap();
    assert!(general.coe.sdo && general.coe.sdo_info && general.coe.pdo_config);
    assert!(!general.coe.sdo_complete_access);
    assert!(general.foe && !general.eoe);

    let usages: Vec<_> = model.fmmus().unwrap().fmmus.iter().map(|f| f.usage).collect();
    assert_eq!(
        usages,
        [FmmuUsage::Outputs, FmmuUsage::Inputs, FmmuUsage::SyncManagerStatus]
    );

    let rx: Vec<_> = model.pdos(PdoDirection::Rx).flat_map(|c| c.pdos.iter()).collect();
    assert_eq!(rx.len(), 1);
    assert_eq!(rx[0].entries[0].subindex, 1);
    assert_eq!(rx[0].entries[0].data_type, 0x06);

    let tx: Vec<_> = model.pdos(PdoDirection::Tx).flat_map(|c| c.pdos.iter()).collect();
    assert_eq!(tx[0].entries[1].data_type, 0x1B);
    assert_eq!(tx[1].sync_manager, 0xFF, "no Sm attribute");

    // The first operation mode activates nothing, the second is used.
    let dc = model.distributed_clock().unwrap();
    assert!(dc.cyclic_op_enabled && dc.sync0_active && !dc.sync1_active);
    assert_eq!(dc.sync0_cycle_time, 1_000_000);
}

#[test]
fn test_first_device_is_default() {
    let model = load("EL6751.xml", 0);
    let general = model.general().unwrap();
    assert_eq!(model.string_at(general.order_index), Some("EK1100"));
    assert_eq!(general.current_on_ebus, -2000);
    assert_eq!(general.ports[0], PortType::Mii);
    assert!(model.fmmus().is_none());
    assert!(model.distributed_clock().is_none());
}

#[test]
fn test_missing_device() {
    let xml = load_test_file("EL6751.xml");
    let err = load_esi_from_str(&xml, &EsiOptions::default().with_device(2)).unwrap_err();
    assert!(matches!(err, EsiError::DeviceNotFound { index: 2, count: 2 }));
}

#[test]
fn test_invalid_values() {
    let xml = r#"<EtherCATInfo>
        <Vendor><Id>#xZZ</Id></Vendor>
        <Descriptions><Devices><Device><Type>X</Type></Device></Devices></Descriptions>
    </EtherCATInfo>"#;
    assert!(matches!(
        load_esi_from_str(xml, &EsiOptions::default()),
        Err(EsiError::InvalidAttributeFormat {
            attribute: "Vendor/Id"
        })
    ));

    let xml = r#"<EtherCATInfo>
        <Vendor><Id>2</Id></Vendor>
        <Descriptions><Devices><Device>
            <Type>X</Type>
            <TxPdo><Index>#x1a00</Index><Entry><Index>#x6000</Index><BitLen>300</BitLen></Entry></TxPdo>
        </Device></Devices></Descriptions>
    </EtherCATInfo>"#;
    assert!(matches!(
        load_esi_from_str(xml, &EsiOptions::default()),
        Err(EsiError::InvalidAttributeFormat { attribute: "BitLen" })
    ));
}

#[test]
fn test_malformed_xml() {
    let err = load_esi_from_str("<EtherCATInfo><Vendor>", &EsiOptions::default()).unwrap_err();
    assert!(matches!(err, EsiError::XmlParsing(_)));
}

#[test]
fn test_unknown_data_type_maps_to_zero() {
    let xml = r##"<EtherCATInfo>
        <Vendor><Id>2</Id></Vendor>
        <Descriptions><Devices><Device>
            <Type ProductCode="#x10">X</Type>
            <RxPdo Sm="2"><Index>#x1600</Index>
                <Entry><Index>#x7000</Index><SubIndex>1</SubIndex><BitLen>128</BitLen><DataType>FLOAT128</DataType></Entry>
            </RxPdo>
        </Device></Devices></Descriptions>
    </EtherCATInfo>"##;
    let model = load_esi_from_str(xml, &EsiOptions::default()).unwrap();
    let rx: Vec<_> = model.pdos(PdoDirection::Rx).flat_map(|c| c.pdos.iter()).collect();
    assert_eq!(rx[0].entries[0].data_type, 0);
    assert_eq!(rx[0].entries[0].bit_length, 128);
    assert_eq!(model.std_config().product_id, 0x10);
}
