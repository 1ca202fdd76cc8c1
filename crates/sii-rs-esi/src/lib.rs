// src/lib.rs

#![no_std]
#![doc = "Maps EtherCAT ESI (EtherCATInfo XML) device descriptions to and from SII category models."]
#![doc = ""]
#![doc = "This `no_std + alloc` library builds on `sii-rs`. It supports:"]
#![doc = "- `load_esi_from_str`: Parsing one `<Device>` of an ESI file into a `CategoryModel`."]
#![doc = "- `save_esi_to_string`: Describing a `CategoryModel` as a single-device ESI file."]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

// --- Crate Modules ---

mod builder;
mod error;
mod model;
mod parser;
mod types;

// --- Public API Re-exports ---

pub use builder::save_esi_to_string;
pub use error::EsiError;
pub use parser::load_esi_from_str;
pub use types::{data_type_code, data_type_name, EsiOptions};
