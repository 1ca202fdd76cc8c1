// crates/sii-rs-esi/src/error.rs

use alloc::fmt;
use hex::FromHexError;
use quick_xml::errors::serialize::DeError;
use quick_xml::errors::serialize::SeError;
use sii_rs::SiiError;

/// Errors that can occur while mapping ESI XML to and from a category model.
#[derive(Debug)]
pub enum EsiError {
    /// An error from the underlying `quick-xml` deserializer.
    XmlParsing(DeError),

    /// An error from the underlying `quick-xml` serializer.
    XmlSerializing(SeError),

    /// A hexBinary element (`ConfigData`, `BootStrap`) contained invalid hex.
    HexParsing(FromHexError),

    /// An error occurred while formatting the output string.
    FmtError(fmt::Error),

    /// An attribute or element value could not be parsed or is out of range.
    InvalidAttributeFormat { attribute: &'static str },

    /// The requested `<Device>` does not exist in `<Devices>`.
    DeviceNotFound { index: usize, count: usize },

    /// The model cannot hold the mapped data (e.g. too many strings).
    Sii(SiiError),
}

impl From<DeError> for EsiError {
    fn from(e: DeError) -> Self {
        EsiError::XmlParsing(e)
    }
}

impl From<SeError> for EsiError {
    fn from(e: SeError) -> Self {
        EsiError::XmlSerializing(e)
    }
}

impl From<FromHexError> for EsiError {
    fn from(e: FromHexError) -> Self {
        EsiError::HexParsing(e)
    }
}

impl From<fmt::Error> for EsiError {
    fn from(e: fmt::Error) -> Self {
        EsiError::FmtError(e)
    }
}

impl From<SiiError> for EsiError {
    fn from(e: SiiError) -> Self {
        EsiError::Sii(e)
    }
}

impl fmt::Display for EsiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EsiError::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            EsiError::XmlSerializing(e) => write!(f, "XML serializing error: {}", e),
            EsiError::HexParsing(e) => write!(f, "Hex parsing error: {}", e),
            EsiError::FmtError(e) => write!(f, "Formatting error: {}", e),
            EsiError::InvalidAttributeFormat { attribute } => {
                write!(f, "Invalid format for attribute: {}", attribute)
            }
            EsiError::DeviceNotFound { index, count } => write!(
                f,
                "Device {} requested but the file describes {} device(s)",
                index, count
            ),
            EsiError::Sii(e) => write!(f, "SII model error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EsiError {}
