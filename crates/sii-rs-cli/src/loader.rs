// crates/sii-rs-cli/src/loader.rs

//! Reads the input, detects its format and turns it into a model.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use sii_rs::{
    CategoryModel, Finding, FindingCode, InputFormat, Location, Severity, SiiCodec,
};
use sii_rs_esi::{load_esi_from_str, save_esi_to_string, EsiOptions};

/// A loaded model with the findings of decoding and validation.
#[derive(Debug)]
pub struct Loaded {
    pub format: InputFormat,
    pub model: CategoryModel,
    pub findings: Vec<Finding>,
}

/// Reads a whole file, or stdin if `path` is `None`.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            info!("Reading {}", path.display());
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// The format announced by the file extension, if it is a known one.
pub fn format_hint(path: Option<&Path>) -> Option<InputFormat> {
    let extension = path?.extension()?.to_str()?;
    let hint = InputFormat::from_extension(extension);
    if hint.is_none() {
        warn!("Unrecognized file extension '{}'", extension);
    }
    hint
}

/// Decodes an SII image or maps an ESI document, depending on the content.
///
/// A contradicting hint is reported as a Warning finding and otherwise
/// ignored.
pub fn load(
    bytes: &[u8],
    hint: Option<InputFormat>,
    codec: &SiiCodec,
    options: &EsiOptions,
) -> Result<Loaded> {
    let format = InputFormat::sniff(bytes);
    debug!("Detected {} input ({} bytes)", format, bytes.len());

    match format {
        InputFormat::Sii => {
            let codec = match hint {
                Some(hint) => SiiCodec::new(codec.config().with_format_hint(hint)),
                None => *codec,
            };
            let decoded = codec.decode(bytes).context("Failed to decode SII image")?;
            Ok(Loaded {
                format,
                model: decoded.model,
                findings: decoded.findings,
            })
        }
        InputFormat::Esi => {
            let mut findings = Vec::new();
            if let Some(hint) = hint.filter(|hint| *hint != format) {
                warn!("Input was announced as {} but looks like {}", hint, format);
                findings.push(Finding::new(
                    Severity::Warning,
                    FindingCode::FormatHintMismatch {
                        hint,
                        detected: format,
                    },
                    Location::at_offset(0),
                ));
            }
            let xml = std::str::from_utf8(bytes).context("ESI input is not valid UTF-8")?;
            let model = load_esi_from_str(xml, options).context("Failed to map ESI file")?;
            findings.extend(codec.validate(&model));
            Ok(Loaded {
                format,
                model,
                findings,
            })
        }
    }
}

/// Writes the model to `path`: ESI for a `.xml` name, a binary image otherwise.
pub fn write_output(
    path: &Path,
    model: &CategoryModel,
    codec: &SiiCodec,
    options: &EsiOptions,
) -> Result<InputFormat> {
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(InputFormat::from_extension)
        .unwrap_or(InputFormat::Sii);

    let bytes = match format {
        InputFormat::Esi => save_esi_to_string(model, options)
            .context("Failed to build ESI document")?
            .into_bytes(),
        InputFormat::Sii => codec.encode(model).context("Failed to encode SII image")?,
    };
    fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} bytes of {} to {}", bytes.len(), format, path.display());
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESI: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<EtherCATInfo>
  <Vendor><Id>2</Id></Vendor>
  <Descriptions><Devices><Device>
    <Type ProductCode="#x10">EL0000</Type>
    <Eeprom><ByteSize>2048</ByteSize></Eeprom>
  </Device></Devices></Descriptions>
</EtherCATInfo>"##;

    #[test]
    fn test_format_hint_from_extension() {
        assert_eq!(format_hint(Some(Path::new("a/b.BIN"))), Some(InputFormat::Sii));
        assert_eq!(format_hint(Some(Path::new("device.xml"))), Some(InputFormat::Esi));
        assert_eq!(format_hint(Some(Path::new("device.txt"))), None);
        assert_eq!(format_hint(Some(Path::new("device"))), None);
        assert_eq!(format_hint(None), None);
    }

    #[test]
    fn test_load_esi_content() {
        let codec = SiiCodec::default();
        let loaded = load(ESI.as_bytes(), None, &codec, &EsiOptions::default()).unwrap();
        assert_eq!(loaded.format, InputFormat::Esi);
        assert_eq!(loaded.model.std_config().product_id, 0x10);
        assert!(loaded.findings.is_empty());
    }

    #[test]
    fn test_content_wins_over_hint() {
        let codec = SiiCodec::default();
        let loaded = load(
            ESI.as_bytes(),
            Some(InputFormat::Sii),
            &codec,
            &EsiOptions::default(),
        )
        .unwrap();
        assert_eq!(loaded.format, InputFormat::Esi);
        assert_eq!(
            loaded.findings[0].code,
            FindingCode::FormatHintMismatch {
                hint: InputFormat::Sii,
                detected: InputFormat::Esi
            }
        );
        assert_eq!(loaded.findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_short_sii_input_fails() {
        let codec = SiiCodec::default();
        let err = load(&[0u8; 10], None, &codec, &EsiOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to decode SII image"));
    }
}
