//! High-level, ergonomic library API: run the whole flow from Verilog to
//! bitstream, or prepare a toolchain install from a `.tar.pixz` archive.
//! Prefer these entrypoints over driving the individual stages when
//! integrating Silkflow.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::flow::Flow;
use crate::core::params::{BitstreamOptions, DesignOptions};
use crate::error::Result;
use crate::io::archive::extract_pixz;
use crate::io::process::{Capture, Invocation, ToolRunner};
use crate::types::Architecture;

/// Inputs of a complete synthesis-to-bitstream run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullFlowParams {
    pub top_module: String,
    pub device: String,
    pub part: String,
    pub pcf: Option<PathBuf>,
    /// Output bitstream; `<top>.bin` when absent
    pub bit: Option<PathBuf>,
    pub verilog_files: Vec<String>,
}

/// Artifacts and timing of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowReport {
    pub arch: Architecture,
    pub top_module: String,
    pub device: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub json: PathBuf,
    pub eblif: PathBuf,
    pub net: PathBuf,
    pub fasm: PathBuf,
    pub bitstream: PathBuf,
}

impl FlowReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Synthesize, pack, place, route, write FASM and assemble the bitstream.
pub fn run_full_flow<R: ToolRunner>(flow: &mut Flow<R>, params: &FullFlowParams) -> Result<FlowReport> {
    let started_at = Utc::now();
    let start = Instant::now();
    info!("Starting flow…");
    info!("---");

    info!("Synthesizing…");
    let synth = flow.synth(&params.top_module, &params.verilog_files)?;

    let mut design = DesignOptions::new(&params.top_module, &params.device, &synth.eblif);
    design.part = Some(params.part.clone());
    design.pcf = params.pcf.clone();

    info!("Packing…");
    let net = flow.pack(&design)?;
    design.net = Some(net.clone());

    info!("Placing…");
    flow.place(&design)?;

    info!("Routing…");
    flow.route(&design)?;

    info!("Writing FASM…");
    let fasm = flow.write_fasm(&design)?;

    info!("Writing bitstream…");
    let bitstream = flow.write_bitstream(&BitstreamOptions {
        top_module: params.top_module.clone(),
        device: params.device.clone(),
        fasm: fasm.clone(),
        bit: params.bit.clone(),
        part: Some(params.part.clone()),
    })?;

    let elapsed_secs = start.elapsed().as_secs_f64();
    info!("Bitstream generated in {:.6}s.", elapsed_secs);

    Ok(FlowReport {
        arch: flow.config().arch,
        top_module: params.top_module.clone(),
        device: params.device.clone(),
        started_at,
        elapsed_secs,
        json: synth.json,
        eblif: synth.eblif,
        net,
        fasm,
        bitstream,
    })
}

/// Inputs for installing one FPGA family from a toolchain archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupParams {
    pub install_dir: PathBuf,
    pub family: String,
    pub archive: PathBuf,
}

/// Archive members needed before the conda environment can be created;
/// everything else is extracted lazily by the flow.
pub const SETUP_MEMBERS: &[&str] = &[
    "environment.yml",
    "requirements.txt",
    "install/share/symbiflow/scripts",
];

/// Paths making up one installed family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyLayout {
    pub family_path: PathBuf,
    pub env_yaml: PathBuf,
    pub rc_file: PathBuf,
    pub base_path: PathBuf,
    pub bin_path: PathBuf,
}

impl FamilyLayout {
    pub fn new(install_dir: &Path, family: &str) -> Self {
        let family_path = install_dir.join(family);
        let base_path = family_path.join("install");
        Self {
            env_yaml: family_path.join("environment.yml"),
            rc_file: family_path.join(".rc"),
            bin_path: base_path.join("bin"),
            base_path,
            family_path,
        }
    }

    /// Shell snippet that activates the family for subsequent flow runs.
    pub fn rc_contents(&self, family: &str, archive_realpath: &Path) -> String {
        let mut rc = String::new();
        rc.push_str("# AUTOGENERATED BY SILKFLOW\n");
        rc.push_str("source $HOME/.bashrc\n");
        rc.push_str(&format!("export PATH={}:$PATH\n", self.bin_path.display()));
        rc.push_str(&format!("export SYMBIFLOW_ARCH={}\n", family));
        rc.push_str(&format!("export SYMBIFLOW_BASE={}\n", self.base_path.display()));
        rc.push_str(&format!(
            "export SILKFLOW_PIXZ_ARCHIVE={}\n",
            archive_realpath.display()
        ));
        rc.push_str(&format!("conda activate {}\n", family));
        rc
    }
}

/// Extract the scripts and environment description for `family`, create its
/// conda environment and write the `.rc` file. Returns the `.rc` path.
pub fn setup_environment<R: ToolRunner>(runner: &mut R, params: &SetupParams) -> Result<PathBuf> {
    let layout = FamilyLayout::new(&params.install_dir, &params.family);
    let archive_realpath = fs::canonicalize(&params.archive)?;

    info!(
        "Extracting {:?} into {:?}",
        archive_realpath, layout.family_path
    );
    extract_pixz(&archive_realpath, &layout.family_path, SETUP_MEMBERS)?;

    create_family_environment(runner, &layout, &params.family, &archive_realpath)
}

/// Create the conda environment of an extracted family and write its `.rc`.
pub fn create_family_environment<R: ToolRunner>(
    runner: &mut R,
    layout: &FamilyLayout,
    family: &str,
    archive_realpath: &Path,
) -> Result<PathBuf> {
    let conda = Invocation::new("conda")
        .args(["env", "create", "--verbose", "-f"])
        .arg(&layout.env_yaml);
    runner.run(&conda, Capture::Inherit)?;

    fs::write(&layout.rc_file, layout.rc_contents(family, archive_realpath))?;

    info!("Done!");
    Ok(layout.rc_file.clone())
}
