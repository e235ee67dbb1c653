//! Shared types and enums used across Silkflow.
//! Includes the target `Architecture` and the flow `Stage` names.
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// FPGA family the flow targets. Selects device files, scripts and the
/// bitstream assembler.
#[derive(
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    ValueEnum,
    Debug,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    Ice40,
    Xc7,
}

impl Architecture {
    pub fn name(&self) -> &'static str {
        match self {
            Architecture::Ice40 => "ice40",
            Architecture::Xc7 => "xc7",
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ice40" => Ok(Architecture::Ice40),
            "xc7" => Ok(Architecture::Xc7),
            _ => Err(Error::UnsupportedArchitecture(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Stage {
    Synth,
    Pack,
    GenerateConstraints,
    Place,
    Route,
    WriteFasm,
    WriteBitstream,
}

impl Stage {
    /// Name used for per-stage log files, e.g. `<project>_pack.log`.
    pub fn command_name(&self) -> &'static str {
        match self {
            Stage::Synth => "synth",
            Stage::Pack => "pack",
            Stage::GenerateConstraints => "generate_constraints",
            Stage::Place => "place",
            Stage::Route => "route",
            Stage::WriteFasm => "write_fasm",
            Stage::WriteBitstream => "write_bitstream",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn architecture_parses_case_insensitively() {
        assert_eq!("ice40".parse::<Architecture>().unwrap(), Architecture::Ice40);
        assert_eq!("XC7".parse::<Architecture>().unwrap(), Architecture::Xc7);
        assert_eq!(" Ice40 ".parse::<Architecture>().unwrap(), Architecture::Ice40);
    }

    #[test]
    fn ice40_is_the_default_family() {
        assert_eq!(Architecture::default(), Architecture::Ice40);
    }

    #[test]
    fn unknown_architecture_is_rejected() {
        match "ecp5".parse::<Architecture>() {
            Err(Error::UnsupportedArchitecture(name)) => assert_eq!(name, "ecp5"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn architecture_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Architecture::Xc7).unwrap(), "\"xc7\"");
        let arch: Architecture = serde_json::from_str("\"ice40\"").unwrap();
        assert_eq!(arch, Architecture::Ice40);
    }

    #[test]
    fn stage_names_match_log_file_convention() {
        assert_eq!(Stage::GenerateConstraints.command_name(), "generate_constraints");
        assert_eq!(Stage::WriteFasm.to_string(), "write_fasm");
    }
}
