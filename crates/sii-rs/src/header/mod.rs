// crates/sii-rs/src/header/mod.rs

//! Codecs for the fixed EEPROM header: the preamble (words 0x00-0x07) and the
//! station configuration (words 0x08-0x3F).

pub mod preamble;
pub mod std_config;

pub use preamble::{checksum, Preamble};
pub use std_config::{MailboxKind, MailboxProtocols, MailboxRegion, StdConfig};

/// Size of the fixed header in bytes. Categories start right after it.
pub const FIXED_HEADER_SIZE: usize = Preamble::SIZE + StdConfig::SIZE;
