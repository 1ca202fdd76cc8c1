// crates/sii-rs-cli/src/cli.rs

//! Command-line arguments and their mapping onto codec options.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use sii_rs::{ChecksumPolicy, CodecConfig, EepromSizeUnit};
use sii_rs_esi::EsiOptions;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Reads an EtherCAT SII EEPROM image or an ESI (EtherCATInfo) XML file,
prints its content and any findings, and optionally converts it.

The input format is detected from the content; the file extension only serves
as a hint. With -o, a name ending in .xml writes an ESI file, any other name
writes a binary SII image.";

#[derive(Parser, Debug)]
#[command(
    name = "siitool",
    version = VERSION,
    about = "Print and convert EtherCAT SII EEPROM images and ESI files",
    long_about = LONG_ABOUT,
    disable_version_flag = true
)]
pub struct Cli {
    #[arg(
        short = 'v',
        long = "version",
        action = ArgAction::Version,
        help = "Print version and exit"
    )]
    pub version: Option<bool>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "NAME",
        long_help = "Write the model to NAME. A .xml extension writes ESI, anything else a binary SII image."
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long = "strict",
        action = ArgAction::SetTrue,
        long_help = "Exit with a non-zero status if any Error finding is reported."
    )]
    pub strict: bool,

    #[arg(
        long = "lenient-checksum",
        action = ArgAction::SetTrue,
        long_help = "Keep decoding when the preamble checksum does not match and report it as a finding."
    )]
    pub lenient_checksum: bool,

    #[arg(
        long = "size-unit",
        value_enum,
        default_value_t = SizeUnit::Words,
        long_help = "Interpretation of the EEPROM size word: 16-bit words, or KiBit minus one."
    )]
    pub size_unit: SizeUnit,

    #[arg(
        long = "device",
        value_name = "INDEX",
        default_value_t = 0,
        long_help = "Device to load when an ESI file describes several."
    )]
    pub device: usize,

    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Do not print the model; findings are still reported."
    )]
    pub quiet: bool,

    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(
        value_name = "FILE",
        help = "Path to the SII or ESI file; read from stdin if missing or '-'"
    )]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizeUnit {
    Words,
    #[value(name = "kbit")]
    KiloBits,
}

impl From<SizeUnit> for EepromSizeUnit {
    fn from(unit: SizeUnit) -> Self {
        match unit {
            SizeUnit::Words => EepromSizeUnit::Words,
            SizeUnit::KiloBits => EepromSizeUnit::KiloBits,
        }
    }
}

impl Cli {
    /// Codec configuration for reading and writing SII images.
    pub fn codec_config(&self) -> CodecConfig {
        let checksum = if self.lenient_checksum {
            ChecksumPolicy::Lenient
        } else {
            ChecksumPolicy::Strict
        };
        CodecConfig::default()
            .with_checksum(checksum)
            .with_size_unit(self.size_unit.into())
    }

    pub fn esi_options(&self) -> EsiOptions {
        EsiOptions::default()
            .with_device(self.device)
            .with_size_unit(self.size_unit.into())
    }

    /// The input path, `None` for stdin.
    pub fn input_path(&self) -> Option<&std::path::Path> {
        self.input.as_deref().filter(|path| path.as_os_str() != "-")
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "warn" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["siitool"]).unwrap();
        assert_eq!(cli.input_path(), None);
        assert_eq!(cli.codec_config(), CodecConfig::default());
        assert_eq!(cli.esi_options(), EsiOptions::default());
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "siitool",
            "--lenient-checksum",
            "--size-unit",
            "kbit",
            "--device",
            "2",
            "-d",
            "-o",
            "out.xml",
            "image.bin",
        ])
        .unwrap();
        let config = cli.codec_config();
        assert_eq!(config.checksum, ChecksumPolicy::Lenient);
        assert_eq!(config.size_unit, EepromSizeUnit::KiloBits);
        assert_eq!(cli.esi_options().device, 2);
        assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("out.xml")));
        assert_eq!(cli.input_path(), Some(std::path::Path::new("image.bin")));
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_dash_reads_stdin() {
        let cli = Cli::try_parse_from(["siitool", "-"]).unwrap();
        assert_eq!(cli.input_path(), None);
    }

    #[test]
    fn test_short_version_flag() {
        let err = Cli::try_parse_from(["siitool", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
