// crates/sii-rs-esi/tests/roundtrip.rs

use sii_rs::category::{
    DistributedClock, FmmuUsage, General, PdoDirection, PortType, StringsCategory,
};
use sii_rs::{Category, CategoryData, CategoryModel, CategoryType, Preamble, StdConfig};
use sii_rs_esi::{load_esi_from_str, save_esi_to_string, EsiOptions};
use std::fs;
use std::path::PathBuf;

fn load_test_file(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(name);

    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test file {:?}: {}", path, e))
}

fn payloads(model: &CategoryModel) -> Vec<&CategoryData> {
    model.categories().iter().map(|c| &c.data).collect()
}

#[test]
fn test_esi_save_and_reload() {
    let _ = env_logger::builder().is_test(true).try_init();

    let options = EsiOptions::default().with_device(1);
    let original = load_esi_from_str(&load_test_file("EL6751.xml"), &options).unwrap();

    let xml = save_esi_to_string(&original, &EsiOptions::default()).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("ProductCode=\"#x1A5F3052\""));
    assert!(xml.contains("<GroupType>CommTerm</GroupType>"));
    assert!(xml.contains("<ByteSize>16384</ByteSize>"));

    let reloaded = load_esi_from_str(&xml, &EsiOptions::default()).unwrap();
    assert_eq!(reloaded.preamble(), original.preamble());
    assert_eq!(reloaded.std_config(), original.std_config());
    assert_eq!(payloads(&reloaded), payloads(&original));
}

#[test]
fn test_esi_to_sii_image() {
    let model = load_esi_from_str(&load_test_file("EL1002.xml"), &EsiOptions::default()).unwrap();

    let image = sii_rs::encode(&model).unwrap();
    let decoded = sii_rs::decode(&image).unwrap();
    assert!(decoded.findings.is_empty(), "{:?}", decoded.findings);

    let back = &decoded.model;
    assert_eq!(back.std_config(), model.std_config());
    // Decoding keeps the zeroed reserved bytes of the General record.
    let mut general = back.general().unwrap().clone();
    assert!(!general.reserved_nonzero());
    general.reserved.clear();
    assert_eq!(Some(&general), model.general());
    assert_eq!(back.strings(), model.strings());
    assert_eq!(
        back.pdos(PdoDirection::Tx).collect::<Vec<_>>(),
        model.pdos(PdoDirection::Tx).collect::<Vec<_>>()
    );

    // The FMMU list is padded to a whole number of words.
    let usages: Vec<_> = back.fmmus().unwrap().fmmus.iter().map(|f| f.usage).collect();
    assert_eq!(usages, [FmmuUsage::Inputs, FmmuUsage::Unused]);

    // The pad entry does not show up in the ESI again.
    let xml = save_esi_to_string(back, &EsiOptions::default()).unwrap();
    assert_eq!(xml.matches("<Fmmu>").count(), 1);
}

#[test]
fn test_model_to_esi() {
    let mut strings = StringsCategory::default();
    strings.strings.push("Coupler".into());
    strings.strings.push("EK9999".into());
    strings.strings.push("Test Coupler".into());

    let mut config = StdConfig {
        vendor_id: 0x0000_0539,
        product_id: 0x2700_3052,
        revision_id: 0x0001_0000,
        eeprom_size: 0x0800,
        ..Default::default()
    };
    config.mailbox_protocols.coe = true;
    config.standard_receive.offset = 0x1000;
    config.standard_receive.size = 128;

    let mut model = CategoryModel::new(Preamble::default(), config);
    model.append_category(Category::new(CategoryData::Strings(strings)));
    let mut general = General {
        group_index: 1,
        order_index: 2,
        name_index: 3,
        current_on_ebus: -1000,
        ports: [PortType::Mii, PortType::Mii, PortType::NotUsed, PortType::NotUsed],
        ..Default::default()
    };
    general.coe.sdo = true;
    general.coe.sdo_info = true;
    model.append_category(Category::new(CategoryData::General(general)));

    let mut dc = DistributedClock {
        sync0_cycle_time: 500_000,
        ..Default::default()
    };
    dc.set_activation(0x0700);
    model.append_category(Category::new(CategoryData::DistributedClock(dc)));

    let options = EsiOptions::default().with_vendor_name("ACME Automation");
    let xml = save_esi_to_string(&model, &options).unwrap();

    assert!(xml.contains("<Id>#x00000539</Id>"));
    assert!(xml.contains("ACME Automation"));
    assert!(xml.contains("Physics=\"YY\""));
    assert!(xml.contains(">EK9999</Type>"));
    assert!(xml.contains("<EBusCurrent>-1000</EBusCurrent>"));
    assert!(xml.contains("<AssignActivate>#x0700</AssignActivate>"));
    assert!(xml.contains("<CoE"));
    assert!(!xml.contains("<FoE"));
    assert!(!xml.contains("<BootStrap>"));

    let reloaded = load_esi_from_str(&xml, &EsiOptions::default()).unwrap();
    let kinds: Vec<_> = reloaded.categories().iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        [CategoryType::Strings, CategoryType::General, CategoryType::DistributedClock]
    );
    assert_eq!(reloaded.std_config().eeprom_size, 0x0800);
    assert_eq!(reloaded.std_config().standard_receive.size, 0);
    let reloaded_general = reloaded.general().unwrap();
    assert_eq!(reloaded.string_at(reloaded_general.name_index), Some("Test Coupler"));
    assert!(reloaded_general.coe.sdo_info);
    assert_eq!(reloaded.distributed_clock().unwrap().activation(), 0x0700);
}
