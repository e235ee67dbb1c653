use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use silkflow::{Architecture, BitstreamOptions, DesignOptions, FullFlowParams, SetupParams};

const LONG_VERSION: &str = concat!(
    "- Version ",
    env!("CARGO_PKG_VERSION"),
    "\n© efabless Corporation 2021-present. All rights reserved."
);

#[derive(Parser, Debug)]
#[command(
    name = "Silkflow",
    bin_name = "silkflow",
    version = concat!("- Version ", env!("CARGO_PKG_VERSION")),
    long_version = LONG_VERSION,
    about = "Open-source FPGA flow: synthesis, pack, place, route and bitstream"
)]
pub struct CliArgs {
    /// Target FPGA family [default: $SYMBIFLOW_ARCH, else ice40]
    #[arg(long, global = true, value_enum, ignore_case = true)]
    pub arch: Option<Architecture>,

    /// Toolchain install prefix containing share/symbiflow
    /// [default: $SYMBIFLOW_BASE, else /opt/symbiflow]
    #[arg(long, global = true)]
    pub base: Option<PathBuf>,

    /// .tar.pixz archive to extract missing device files from
    /// [default: $SILKFLOW_PIXZ_ARCHIVE]
    #[arg(long, global = true)]
    pub archive: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize
    Synth(SynthArgs),
    /// Pack
    Pack(VprArgs),
    /// Generate constraints
    #[command(alias = "generate_constraints")]
    GenerateConstraints(VprArgs),
    /// Place
    Place(VprArgs),
    /// Route
    Route(VprArgs),
    /// Write FASM
    #[command(alias = "write_fasm")]
    WriteFasm(VprArgs),
    /// Write bitstream
    #[command(alias = "write_bitstream")]
    WriteBitstream(BitstreamArgs),
    /// Full flow
    Run(RunArgs),
    /// Setup environment from .pixz file
    Setup(SetupArgs),
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Top module
    #[arg(short, long)]
    pub top_module: String,

    /// Verilog sources
    #[arg(required = true)]
    pub verilog_files: Vec<String>,
}

/// Options shared by the VPR-driven stages
#[derive(Args, Debug)]
pub struct VprArgs {
    /// Top module
    #[arg(short, long)]
    pub top_module: String,

    /// Target device, e.g. hx1k-tq144
    #[arg(short, long)]
    pub device: String,

    /// Synthesized netlist
    #[arg(short, long)]
    pub eblif: PathBuf,

    /// Device part (package variant)
    #[arg(short = 'P', long)]
    pub part: Option<String>,

    /// Pin constraints
    #[arg(short, long)]
    pub pcf: Option<PathBuf>,

    /// Packed netlist; <top>.net when omitted
    #[arg(short, long)]
    pub net: Option<PathBuf>,

    /// Timing constraints
    #[arg(short, long)]
    pub sdc: Option<PathBuf>,
}

impl From<VprArgs> for DesignOptions {
    fn from(args: VprArgs) -> Self {
        DesignOptions {
            top_module: args.top_module,
            device: args.device,
            eblif: args.eblif,
            part: args.part,
            pcf: args.pcf,
            net: args.net,
            sdc: args.sdc,
        }
    }
}

#[derive(Args, Debug)]
pub struct BitstreamArgs {
    /// Top module
    #[arg(short, long)]
    pub top_module: String,

    /// Target device, e.g. hx1k-tq144
    #[arg(short, long)]
    pub device: String,

    /// Output bitstream
    #[arg(short, long)]
    pub bit: PathBuf,

    /// FASM input
    #[arg(short, long)]
    pub fasm: PathBuf,

    /// Device part (package variant)
    #[arg(short = 'P', long)]
    pub part: Option<String>,
}

impl From<BitstreamArgs> for BitstreamOptions {
    fn from(args: BitstreamArgs) -> Self {
        BitstreamOptions {
            top_module: args.top_module,
            device: args.device,
            fasm: args.fasm,
            bit: Some(args.bit),
            part: args.part,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Top module
    #[arg(short, long)]
    pub top_module: String,

    /// Target device, e.g. hx1k-tq144
    #[arg(short, long)]
    pub device: String,

    /// Device part (package variant)
    #[arg(short = 'P', long)]
    pub part: String,

    /// Pin constraints
    #[arg(short, long)]
    pub pcf: Option<PathBuf>,

    /// Output bitstream; <top>.bin when omitted
    #[arg(short, long)]
    pub bit: Option<PathBuf>,

    /// Write a JSON summary of the run here
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Verilog sources
    #[arg(required = true)]
    pub verilog_files: Vec<String>,
}

impl RunArgs {
    pub fn flow_params(&self) -> FullFlowParams {
        FullFlowParams {
            top_module: self.top_module.clone(),
            device: self.device.clone(),
            part: self.part.clone(),
            pcf: self.pcf.clone(),
            bit: self.bit.clone(),
            verilog_files: self.verilog_files.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Directory families are installed under
    #[arg(short, long)]
    pub install_dir: PathBuf,

    /// Family name, e.g. ice40
    #[arg(short, long)]
    pub family: String,

    /// Toolchain archive
    pub pixz_archive: PathBuf,
}

impl From<SetupArgs> for SetupParams {
    fn from(args: SetupArgs) -> Self {
        SetupParams {
            install_dir: args.install_dir,
            family: args.family,
            archive: args.pixz_archive,
        }
    }
}
