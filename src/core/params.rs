use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Architecture;

pub const ENV_ARCH: &str = "SYMBIFLOW_ARCH";
pub const ENV_BASE: &str = "SYMBIFLOW_BASE";
pub const ENV_ARCHIVE: &str = "SILKFLOW_PIXZ_ARCHIVE";
pub const ENV_PRINT_JSON_ERRORS: &str = "PRINT_JSON_ERRORS";

pub const DEFAULT_BASE_DIR: &str = "/opt/symbiflow";

/// Flow-wide settings: where the toolchain lives, which family it targets,
/// and where intermediate files go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub arch: Architecture,
    /// Toolchain install prefix containing `share/symbiflow`
    pub base_dir: PathBuf,
    /// `.tar.pixz` archive to extract missing device files from on demand
    pub archive: Option<PathBuf>,
    /// Directory all tools are run in
    pub work_dir: PathBuf,
    /// Prefix for intermediate files; the base name of `work_dir`
    pub project: String,
    /// Emit diagnostics as JSON on stdout in addition to the stderr listing
    pub print_json_errors: bool,
}

impl FlowConfig {
    pub fn new(arch: Architecture, base_dir: PathBuf, archive: Option<PathBuf>) -> Result<Self> {
        let work_dir = env::current_dir()?;
        Ok(Self {
            arch,
            base_dir,
            archive,
            project: project_name(&work_dir),
            work_dir,
            print_json_errors: print_json_errors_from_env(),
        })
    }

    /// Resolve the configuration from the process environment and the
    /// current directory.
    pub fn from_env() -> Result<Self> {
        Self::with_overrides(None, None, None)
    }

    /// Like [`FlowConfig::from_env`], but explicit values win over the
    /// environment. Unset and empty variables fall back to the defaults.
    pub fn with_overrides(
        arch: Option<Architecture>,
        base_dir: Option<PathBuf>,
        archive: Option<PathBuf>,
    ) -> Result<Self> {
        Self::resolve(|key| env::var_os(key), env::current_dir()?, arch, base_dir, archive)
    }

    fn resolve<F>(
        lookup: F,
        work_dir: PathBuf,
        arch: Option<Architecture>,
        base_dir: Option<PathBuf>,
        archive: Option<PathBuf>,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let arch = match arch {
            Some(arch) => arch,
            None => match non_empty(ENV_ARCH) {
                Some(name) => name.to_string_lossy().parse()?,
                None => Architecture::default(),
            },
        };
        let base_dir = base_dir
            .or_else(|| non_empty(ENV_BASE).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));
        let archive = archive.or_else(|| non_empty(ENV_ARCHIVE).map(PathBuf::from));

        Ok(Self {
            arch,
            base_dir,
            archive,
            project: project_name(&work_dir),
            work_dir,
            print_json_errors: lookup(ENV_PRINT_JSON_ERRORS).is_some_and(|v| v == "1"),
        })
    }

    pub fn with_work_dir<P: Into<PathBuf>>(mut self, work_dir: P) -> Self {
        self.work_dir = work_dir.into();
        self.project = project_name(&self.work_dir);
        self
    }

    pub fn with_print_json_errors(mut self, enabled: bool) -> Self {
        self.print_json_errors = enabled;
        self
    }

    /// `<project>_<suffix>`
    pub fn project_file(&self, suffix: &str) -> PathBuf {
        PathBuf::from(format!("{}_{}", self.project, suffix))
    }

    pub fn in_work_dir<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.work_dir.join(path)
    }
}

fn project_name(work_dir: &Path) -> String {
    work_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

fn print_json_errors_from_env() -> bool {
    env::var_os(ENV_PRINT_JSON_ERRORS).is_some_and(|v| v == "1")
}

/// Inputs shared by the VPR-driven stages (pack, constraints, place, route, FASM)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignOptions {
    pub top_module: String,
    pub device: String,
    pub eblif: PathBuf,
    pub part: Option<String>,
    pub pcf: Option<PathBuf>,
    pub net: Option<PathBuf>,
    pub sdc: Option<PathBuf>,
}

impl DesignOptions {
    pub fn new<T: Into<String>, D: Into<String>, E: Into<PathBuf>>(
        top_module: T,
        device: D,
        eblif: E,
    ) -> Self {
        Self {
            top_module: top_module.into(),
            device: device.into(),
            eblif: eblif.into(),
            ..Default::default()
        }
    }

    /// Packed netlist; VPR names it after the top module unless given.
    pub fn net_file(&self) -> PathBuf {
        self.net
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.net", self.top_module)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BitstreamOptions {
    pub top_module: String,
    pub device: String,
    pub fasm: PathBuf,
    /// Output bitstream; `<top>.bin` when absent
    pub bit: Option<PathBuf>,
    pub part: Option<String>,
}

impl BitstreamOptions {
    pub fn bitstream_file(&self) -> PathBuf {
        self.bit
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.bin", self.top_module)))
    }
}
