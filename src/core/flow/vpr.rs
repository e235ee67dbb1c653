//! VPR and genfasm argument lists, and the pack/place/route stages built on them.
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Flow;
use crate::core::params::DesignOptions;
use crate::error::Result;
use crate::io::files::ArchInfo;
use crate::io::process::{Capture, Invocation, ToolRunner};
use crate::types::Stage;

/// VPR always writes its console log here; each stage renames it afterwards.
pub const VPR_STDOUT_LOG: &str = "vpr_stdout.log";

/// Device family prefix, e.g. `hx8k` for `hx8k-ct256`.
pub fn device_base(device: &str) -> &str {
    device.split('-').next().unwrap_or(device)
}

/// Router and placer settings shared by every VPR and genfasm run.
pub fn vpr_options<P: AsRef<Path>>(noisy_warnings_log: P) -> Vec<OsString> {
    let mut options: Vec<OsString> = [
        "--max_router_iterations", "500",
        "--routing_failure_predictor", "off",
        "--router_high_fanout_threshold", "-1",
        "--constant_net_method", "route",
        "--route_chan_width", "100",
        "--clock_modeling", "route",
        "--place_delay_model", "delta_override",
        "--router_lookahead", "map",
        "--check_route", "quick",
        "--strict_checks", "off",
        "--allow_dangling_combinational_nodes", "on",
        "--disable_errors", "check_unbuffered_edges:check_route",
        "--congested_routing_iteration_threshold", "0.8",
        "--incremental_reroute_delay_ripup", "off",
        "--base_cost_type", "delay_normalized_length_bounded",
        "--bb_factor", "10",
        "--initial_pres_fac", "4.0",
        "--check_rr_graph", "off",
        "--suppress_warnings",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    options.push(noisy_warnings_log.as_ref().as_os_str().to_os_string());
    options
}

/// `vpr <arch> <eblif> --device ... <options> [--sdc <sdc>] <stage args>`
pub fn vpr_invocation(
    info: &ArchInfo,
    opts: &DesignOptions,
    noisy_warnings_log: &Path,
    stage_args: &[OsString],
) -> Invocation {
    Invocation::new("vpr")
        .arg(&info.definition)
        .arg(&opts.eblif)
        .arg("--device")
        .arg(&opts.device)
        .arg("--read_rr_graph")
        .arg(&info.rr_graph)
        .arg("--read_placement_delay_lookup")
        .arg(&info.place_delay)
        .args(vpr_options(noisy_warnings_log))
        .opt_arg("--sdc", opts.sdc.as_ref())
        .args(stage_args)
        .env("TOP", &opts.top_module)
}

/// `genfasm <arch> <eblif> --device ... --read_rr_graph ... <options> <stage args>`
pub fn genfasm_invocation(
    info: &ArchInfo,
    opts: &DesignOptions,
    noisy_warnings_log: &Path,
    stage_args: &[OsString],
) -> Invocation {
    Invocation::new("genfasm")
        .arg(&info.definition)
        .arg(&opts.eblif)
        .arg("--device")
        .arg(&opts.device)
        .arg("--read_rr_graph")
        .arg(&info.rr_graph)
        .args(vpr_options(noisy_warnings_log))
        .args(stage_args)
        .env("TOP", &opts.top_module)
}

impl<R: ToolRunner> Flow<R> {
    pub(crate) fn run_vpr(
        &mut self,
        stage: Stage,
        opts: &DesignOptions,
        stage_args: &[OsString],
    ) -> Result<()> {
        let info = self.files.arch_info(self.config.arch, &opts.device)?;
        let noisy = self.noisy_warnings_log(stage);
        let inv = vpr_invocation(&info, opts, &noisy, stage_args)
            .current_dir(&self.config.work_dir);
        self.runner.run(&inv, Capture::Inherit)?;
        self.keep_vpr_log(stage)
    }

    pub(crate) fn run_genfasm(
        &mut self,
        stage: Stage,
        opts: &DesignOptions,
        stage_args: &[OsString],
    ) -> Result<()> {
        let info = self.files.arch_info(self.config.arch, &opts.device)?;
        let noisy = self.noisy_warnings_log(stage);
        let inv = genfasm_invocation(&info, opts, &noisy, stage_args)
            .current_dir(&self.config.work_dir);
        self.runner.run(&inv, Capture::Inherit)?;
        self.keep_vpr_log(stage)
    }

    /// Move `vpr_stdout.log` to `<project>_<stage>.log` so the next run
    /// does not overwrite it.
    fn keep_vpr_log(&self, stage: Stage) -> Result<()> {
        let from = self.work_path(VPR_STDOUT_LOG);
        let to = self.work_path(self.stage_log(stage));
        debug!("Moving {:?} to {:?}", from, to);
        fs::rename(&from, &to)?;
        Ok(())
    }

    /// Pack the synthesized netlist into clusters; returns `<top>.net`.
    pub fn pack(&mut self, opts: &DesignOptions) -> Result<PathBuf> {
        self.run_vpr(Stage::Pack, opts, &[OsString::from("--pack")])?;
        let net = PathBuf::from(format!("{}.net", opts.top_module));
        info!("Packed netlist: {}", net.display());
        Ok(net)
    }

    /// Generate placement constraints, then place with the clusters fixed.
    pub fn place(&mut self, opts: &DesignOptions) -> Result<()> {
        info!("Generating constraints…");
        let constraints = self.generate_constraints(opts)?;
        let args = [
            OsString::from("--fix_clusters"),
            constraints.into_os_string(),
            OsString::from("--place"),
        ];
        self.run_vpr(Stage::Place, opts, &args)
    }

    pub fn route(&mut self, opts: &DesignOptions) -> Result<()> {
        self.run_vpr(Stage::Route, opts, &[OsString::from("--route")])
    }
}
