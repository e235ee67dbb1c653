//! Stage wiring checked against a runner that records invocations and fakes
//! the files each tool would leave behind.
use std::fs;
use std::path::{Path, PathBuf};

use silkflow::{
    Architecture, BitstreamOptions, Capture, DesignOptions, Error, FileManager, Flow, FlowConfig,
    FullFlowParams, Invocation, Result, ToolOutput, ToolRunner, run_full_flow,
};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingRunner {
    calls: Vec<(Invocation, Capture)>,
    synth_stderr: String,
    fail: Option<&'static str>,
}

impl RecordingRunner {
    fn programs(&self) -> Vec<String> {
        self.calls.iter().map(|(inv, _)| inv.program_name()).collect()
    }

    /// Calls whose first argument ends with `script`.
    fn script_calls(&self, script: &str) -> Vec<&Invocation> {
        self.calls
            .iter()
            .map(|(inv, _)| inv)
            .filter(|inv| {
                inv.arg_strings()
                    .first()
                    .is_some_and(|a| a.ends_with(script))
            })
            .collect()
    }
}

impl ToolRunner for RecordingRunner {
    fn execute(&mut self, invocation: &Invocation, capture: Capture) -> Result<ToolOutput> {
        self.calls.push((invocation.clone(), capture));
        let program = invocation.program_name();
        let cwd = invocation.current_dir.clone().unwrap_or_default();

        if self.fail == Some(program.as_str()) {
            return Ok(ToolOutput::failed(1).with_stderr(self.synth_stderr.clone()));
        }

        let output = match program.as_str() {
            "vpr" | "genfasm" => {
                fs::write(cwd.join("vpr_stdout.log"), "vpr log")?;
                if program == "genfasm" {
                    let top = invocation.env["TOP"].to_string_lossy().into_owned();
                    fs::write(cwd.join(format!("{}.fasm", top)), "routed\n")?;
                }
                ToolOutput::ok()
            }
            "yosys" => ToolOutput::ok().with_stderr(self.synth_stderr.clone()),
            "icepack" => ToolOutput::ok().with_stdout(&b"\xff\x00bitstream"[..]),
            "python3" if capture == Capture::Stdout => {
                let script = invocation.arg_strings()[0].clone();
                ToolOutput::ok().with_stdout(format!("from {}\n", script))
            }
            _ => ToolOutput::ok(),
        };
        Ok(output)
    }
}

struct Fixture {
    _root: TempDir,
    work: PathBuf,
    base: PathBuf,
    bin: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("blinky");
        let base = root.path().join("install");
        let bin = root.path().join("bin");
        fs::create_dir_all(&work).unwrap();
        fs::create_dir_all(&base).unwrap();
        fs::create_dir_all(&bin).unwrap();
        Self {
            _root: root,
            work,
            base,
            bin,
        }
    }

    fn flow(&self, arch: Architecture, runner: RecordingRunner) -> Flow<RecordingRunner> {
        let config = FlowConfig::new(arch, self.base.clone(), None)
            .unwrap()
            .with_work_dir(&self.work)
            .with_print_json_errors(false);
        let files = FileManager::new(&self.base, None).with_search_path(&self.bin);
        Flow::new(config, runner).with_file_manager(files)
    }

    #[cfg(unix)]
    fn install_icebox(&self) {
        use std::os::unix::fs::PermissionsExt;

        let icebox = self.bin.join("icebox.py");
        fs::write(&icebox, "#!/usr/bin/env python3\n").unwrap();
        fs::set_permissions(&icebox, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

fn design(top: &str, device: &str) -> DesignOptions {
    DesignOptions::new(top, device, format!("{}.eblif", top))
}

#[cfg(unix)]
#[test]
fn full_ice40_flow_runs_every_stage_in_order() {
    let fx = Fixture::new();
    fx.install_icebox();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());

    let params = FullFlowParams {
        top_module: "top".into(),
        device: "hx1k-tq144".into(),
        part: "hx1k".into(),
        pcf: Some(PathBuf::from("top.pcf")),
        bit: None,
        verilog_files: vec!["top.v".into()],
    };
    let report = run_full_flow(&mut flow, &params).unwrap();

    assert_eq!(report.arch, Architecture::Ice40);
    assert_eq!(report.json, PathBuf::from("top.json"));
    assert_eq!(report.eblif, PathBuf::from("top.eblif"));
    assert_eq!(report.net, PathBuf::from("top.net"));
    assert_eq!(report.fasm, PathBuf::from("top.fasm"));
    assert_eq!(report.bitstream, PathBuf::from("top.bin"));

    let runner = flow.runner();
    assert_eq!(
        runner.programs(),
        [
            "yosys", "yosys", "python3", // synth
            "vpr",     // pack
            "python3", "vpr", // constraints + place
            "vpr",     // route
            "genfasm", // fasm
            "python3", "icepack", // bitstream
        ]
    );
    for (inv, _) in &runner.calls {
        assert_eq!(inv.current_dir.as_deref(), Some(fx.work.as_path()));
    }

    assert_eq!(
        fs::read(fx.work.join("top.bin")).unwrap(),
        b"\xff\x00bitstream"
    );
    for stage in ["pack", "place", "route", "write_fasm"] {
        let log = fx.work.join(format!("blinky_{}.log", stage));
        assert!(log.exists(), "missing {}", log.display());
    }
    assert!(!fx.work.join("vpr_stdout.log").exists());
}

#[cfg(unix)]
#[test]
fn ice40_placement_uses_generated_io_place() {
    let fx = Fixture::new();
    fx.install_icebox();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());

    let mut opts = design("top", "hx8k-ct256");
    opts.pcf = Some(PathBuf::from("top.pcf"));
    flow.place(&opts).unwrap();

    let pinmap = fx
        .base
        .join("share/symbiflow/devices/ice40/layouts/icebox/hx8k.ct256.pinmap.csv")
        .to_string_lossy()
        .into_owned();
    let runner = flow.runner();
    let ioplace = runner.script_calls("ice40_create_ioplace.py");
    assert_eq!(ioplace.len(), 1);
    let args = ioplace[0].arg_strings();
    assert_eq!(
        args[1..],
        [
            "--blif",
            "top.eblif",
            "--net",
            "top.net",
            "--map",
            pinmap.as_str(),
            "--pcf",
            "top.pcf",
            "--out",
            "blinky.io.place",
        ]
    );
    let pythonpath = ioplace[0].env["PYTHONPATH"].clone();
    assert!(std::env::split_paths(&pythonpath).any(|p| p == fx.bin));

    let (vpr, _) = runner.calls.last().unwrap();
    let vpr_args = vpr.arg_strings();
    assert_eq!(
        vpr_args[vpr_args.len() - 3..],
        ["--fix_clusters", "blinky.io.place", "--place"]
    );
}

#[test]
fn synth_reports_diagnostics_and_propagates_failure() {
    let fx = Fixture::new();
    let runner = RecordingRunner {
        synth_stderr: "top.v:12: ERROR: syntax error\nWarning: unused wire\n".into(),
        fail: Some("yosys"),
        ..Default::default()
    };
    let mut flow = fx.flow(Architecture::Ice40, runner);

    let err = flow.synth("top", &["top.v".to_string()]).unwrap_err();
    match err {
        Error::CommandFailed { command, code } => {
            assert!(command.starts_with("yosys -p tcl "));
            assert!(command.ends_with("-l blinky_synth.log top.v"));
            assert_eq!(code, Some(1));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing runs after the failing pass
    assert_eq!(flow.runner().calls.len(), 1);

    let diagnostics = flow.diagnostics();
    let messages: Vec<&str> = diagnostics.all().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        ["top.v:12: ERROR: syntax error", "Warning: unused wire"]
    );

    let mut listing = Vec::new();
    let mut json = Vec::new();
    diagnostics.write_report(&mut listing, &mut json, true).unwrap();
    assert_eq!(
        String::from_utf8(listing).unwrap(),
        "top.v:12: ERROR: syntax error\nWarning: unused wire\n"
    );
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["errors"].as_array().unwrap().len(), 1);
    assert_eq!(value["errors"][0]["file"], "top.v");
    assert_eq!(value["errors"][0]["line"], 12);
    assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(value["warnings"][0]["file"], serde_json::Value::Null);
    assert_eq!(value["warnings"][0]["message"], "Warning: unused wire");
}

#[test]
fn synth_keeps_warnings_of_a_successful_run() {
    let fx = Fixture::new();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());
    flow.synth("top", &["top.v".to_string()]).unwrap();
    assert!(flow.diagnostics().is_empty());

    let runner = RecordingRunner {
        synth_stderr: "top.v:4: Warning: wire `w' is never used\n".into(),
        ..Default::default()
    };
    let mut flow = fx.flow(Architecture::Ice40, runner);
    flow.synth("top", &["top.v".to_string()]).unwrap();
    let warnings: Vec<_> = flow.diagnostics().warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].line, Some(4));
    assert_eq!(flow.diagnostics().errors().count(), 0);
}

#[test]
fn synth_passes_outputs_through_the_environment() {
    let fx = Fixture::new();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());

    let out = flow
        .synth("top", &["top.v".to_string(), "uart.v".to_string()])
        .unwrap();
    assert_eq!(out.eblif, PathBuf::from("top.eblif"));

    let runner = flow.runner();
    let (first, capture) = &runner.calls[0];
    assert_eq!(*capture, Capture::Stderr);
    assert_eq!(first.env["OUT_JSON"], "blinky_synth.json");
    assert_eq!(first.env["OUT_SYNTH_V"], "blinky_synth.v");
    assert_eq!(first.env["OUT_EBLIF"], "top.eblif");
    assert_eq!(first.env["TOP"], "top");

    let conv = runner.calls[1].0.arg_strings();
    assert!(conv[1].starts_with("read_json blinky_synth.json; tcl "));
    assert!(conv[1].ends_with("ice40/yosys/conv.tcl"));

    let split = runner.script_calls("split_inouts.py");
    assert_eq!(
        split[0].arg_strings()[1..],
        ["-i", "blinky_synth.json", "-o", "top.json"]
    );
}

#[test]
fn synth_requires_sources() {
    let fx = Fixture::new();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());
    assert!(matches!(
        flow.synth("top", &[]),
        Err(Error::MissingArgument(_))
    ));
    assert!(flow.runner().calls.is_empty());
}

#[test]
fn pack_keeps_the_vpr_log_per_stage() {
    let fx = Fixture::new();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());

    let net = flow.pack(&design("top", "hx1k-tq144")).unwrap();
    assert_eq!(net, PathBuf::from("top.net"));
    assert_eq!(
        fs::read_to_string(fx.work.join("blinky_pack.log")).unwrap(),
        "vpr log"
    );

    let (vpr, _) = &flow.runner().calls[0];
    let args = vpr.arg_strings();
    assert_eq!(args.last().map(String::as_str), Some("--pack"));
    let noisy = args.iter().position(|a| a == "--suppress_warnings").unwrap();
    assert_eq!(args[noisy + 1], "blinky_noisy_warnings_pack.log");
}

#[test]
fn fasm_extra_is_appended() {
    let fx = Fixture::new();
    fs::write(fx.work.join("top_fasm_extra.fasm"), "extra\n").unwrap();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());

    let fasm = flow.write_fasm(&design("top", "hx1k-tq144")).unwrap();
    assert_eq!(fasm, PathBuf::from("top.fasm"));
    assert_eq!(
        fs::read_to_string(fx.work.join("top.fasm")).unwrap(),
        "routed\nextra\n"
    );
    assert!(fx.work.join("blinky_write_fasm.log").exists());
}

#[test]
fn xc7_constraints_are_written_from_script_output() {
    let fx = Fixture::new();
    let mut flow = fx.flow(Architecture::Xc7, RecordingRunner::default());

    let mut opts = design("top", "xc7a50t_test");
    opts.part = Some("xc7a35tcpg236-1".into());
    let constraints = flow.generate_constraints(&opts).unwrap();
    assert_eq!(constraints, PathBuf::from("blinky_constraints.place"));

    let read = |name: &str| fs::read_to_string(fx.work.join(name)).unwrap();
    assert!(read("blinky.ioplace").ends_with("create_ioplace.py\n"));
    assert!(read("blinky_constraints.place").ends_with("create_place_constraints.py\n"));

    let runner = flow.runner();
    let place = runner.script_calls("create_place_constraints.py");
    let args = place[0].arg_strings();
    let grid = args.iter().position(|a| a == "--vpr_grid_map").unwrap();
    assert!(args[grid + 1].ends_with("devices/xc7/xc7a50t_test/vpr_grid_map.csv"));
    assert_eq!(args.last().map(String::as_str), Some("blinky.ioplace"));
}

#[test]
fn xc7_constraints_need_a_part() {
    let fx = Fixture::new();
    let mut flow = fx.flow(Architecture::Xc7, RecordingRunner::default());
    assert!(matches!(
        flow.generate_constraints(&design("top", "xc7a50t_test")),
        Err(Error::MissingArgument(arg)) if arg == "part"
    ));
}

#[test]
fn xc7_bitstream_is_not_available() {
    let fx = Fixture::new();
    let mut flow = fx.flow(Architecture::Xc7, RecordingRunner::default());
    let opts = BitstreamOptions {
        top_module: "top".into(),
        device: "xc7a50t_test".into(),
        fasm: PathBuf::from("top.fasm"),
        bit: None,
        part: None,
    };
    assert!(matches!(
        flow.write_bitstream(&opts),
        Err(Error::NotImplemented(_))
    ));
    assert!(flow.runner().calls.is_empty());
}

#[cfg(unix)]
#[test]
fn ice40_bitstream_honours_output_path() {
    let fx = Fixture::new();
    fx.install_icebox();
    let mut flow = fx.flow(Architecture::Ice40, RecordingRunner::default());
    let opts = BitstreamOptions {
        top_module: "top".into(),
        device: "up5k-sg48".into(),
        fasm: PathBuf::from("top.fasm"),
        bit: Some(PathBuf::from("out.bin")),
        part: None,
    };

    let bit = flow.write_bitstream(&opts).unwrap();
    assert_eq!(bit, Path::new("out.bin"));
    assert!(fx.work.join("out.bin").exists());

    let runner = flow.runner();
    let fasm2asc = runner.script_calls("fasm2asc.py");
    assert_eq!(
        fasm2asc[0].arg_strings()[1..],
        ["--device", "up5k", "top.fasm", "top.asc"]
    );
    let (icepack, capture) = runner.calls.last().unwrap();
    assert_eq!(icepack.program_name(), "icepack");
    assert_eq!(icepack.arg_strings(), ["top.asc"]);
    assert_eq!(*capture, Capture::Stdout);
}
