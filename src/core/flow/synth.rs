use std::ffi::OsStr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::Flow;
use crate::core::diagnostics::{DiagnosticClassifier, ErrorReporter};
use crate::error::{Error, Result};
use crate::io::process::{Capture, ToolRunner};
use crate::types::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthOutputs {
    /// Netlist with split inouts, `<top>.json`
    pub json: PathBuf,
    /// Netlist for VPR, `<top>.eblif`
    pub eblif: PathBuf,
}

impl<R: ToolRunner> Flow<R> {
    /// Synthesize `verilog_files` with yosys and convert the result for VPR.
    ///
    /// Yosys diagnostics from the first pass are classified and reported
    /// whether or not synthesis succeeds.
    pub fn synth(&mut self, top_module: &str, verilog_files: &[String]) -> Result<SynthOutputs> {
        if verilog_files.is_empty() {
            return Err(Error::missing("verilog_files"));
        }
        self.diagnostics = ErrorReporter::new();
        let arch = self.config.arch;

        let log_file = self.stage_log(Stage::Synth);
        let output_json = self.config.project_file("synth.json");
        let output_verilog = self.config.project_file("synth.v");
        let output_eblif = PathBuf::from(format!("{}.eblif", top_module));
        let final_json = PathBuf::from(format!("{}.json", top_module));

        let env = [
            ("OUT_JSON", output_json.as_os_str()),
            ("OUT_SYNTH_V", output_verilog.as_os_str()),
            ("OUT_EBLIF", output_eblif.as_os_str()),
            ("TOP", OsStr::new(top_module)),
        ];

        let synth_tcl = self.files.yosys_script(arch, "synth.tcl");
        let synth = self
            .tool("yosys")
            .arg("-p")
            .arg(format!("tcl {}", synth_tcl.display()))
            .arg("-l")
            .arg(&log_file)
            .args(verilog_files)
            .envs(env);

        let output = self.runner.execute(&synth, Capture::Stderr)?;

        let classifier = DiagnosticClassifier::new(verilog_files);
        let mut reporter = ErrorReporter::new();
        reporter.classify(&classifier, &output.stderr_text());
        reporter.report(self.config.print_json_errors)?;
        self.diagnostics = reporter;
        output.check(&synth)?;

        let conv_tcl = self.files.yosys_script(arch, "conv.tcl");
        let conv = self
            .tool("yosys")
            .arg("-p")
            .arg(format!(
                "read_json {}; tcl {}",
                output_json.display(),
                conv_tcl.display()
            ))
            .envs(env);
        self.runner.run(&conv, Capture::Inherit)?;

        let split = self
            .tool("python3")
            .arg(self.files.script("split_inouts.py"))
            .arg("-i")
            .arg(&output_json)
            .arg("-o")
            .arg(&final_json)
            .envs(env);
        self.runner.run(&split, Capture::Inherit)?;

        info!("Synthesis netlist: {}", output_eblif.display());
        Ok(SynthOutputs {
            json: final_json,
            eblif: output_eblif,
        })
    }
}
