#![cfg_attr(not(feature = "std"), no_std)]

//! Codec for EtherCAT Slave Information Interface (SII) EEPROM images.
//!
//! An image is decoded into a [`CategoryModel`], checked by the [`Validator`],
//! and written back by the [`BinaryGenerator`] with a recomputed checksum and
//! recomputed category sizes.

// 'alloc' is used for category payloads and string tables
extern crate alloc;

// --- Foundation Modules ---
pub mod types;
pub mod cursor;
pub mod error;
pub mod config;
mod log;

// --- Image Layout ---
pub mod header;
pub mod category;

// --- Model, Checks and Serialization ---
pub mod model;
pub mod finding;
pub mod validator;
pub mod generator;
pub mod codec;

// --- Top-level Exports ---
pub use types::{CategoryType, EepromSizeUnit};
pub use cursor::Cursor;
pub use error::{GenerationError, MalformedCategory, MalformedReason, SiiError};
pub use config::{ChecksumPolicy, CodecConfig, InputFormat};
pub use header::{Preamble, StdConfig, FIXED_HEADER_SIZE};
pub use category::{Category, CategoryData, CategoryId};
pub use model::CategoryModel;
pub use finding::{Finding, FindingCode, Location, Severity};
pub use validator::{validate, Validator};
pub use generator::{BinaryGenerator, Generated};
pub use codec::{decode, encode, Decoded, SiiCodec};
