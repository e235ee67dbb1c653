#![doc = r#"
SILKFLOW: a command-line orchestrator for the open-source FPGA flow.

This crate drives an installed SymbiFlow toolchain through synthesis (yosys),
packing, placement and routing (VPR), FASM generation (genfasm) and bitstream
assembly (icestorm). It owns none of those algorithms: every step builds an
argument list, names the intermediate files, sets the environment the tool
scripts expect, and runs the tool synchronously, failing on a non-zero exit.

Requirements
------------
- A SymbiFlow install (`$SYMBIFLOW_BASE/share/symbiflow`), or a `.tar.pixz`
  archive of one (`$SILKFLOW_PIXZ_ARCHIVE`) to extract device files from.
- `yosys`, `vpr`, `genfasm`, `python3` and, for iCE40, `icepack` and
  `icebox.py` on `PATH`.

Quick start: the whole flow
---------------------------
```rust,no_run
use silkflow::{run_full_flow, Flow, FlowConfig, FullFlowParams, SystemRunner};

fn main() -> silkflow::Result<()> {
    let config = FlowConfig::from_env()?;
    let mut flow = Flow::new(config, SystemRunner);

    let report = run_full_flow(
        &mut flow,
        &FullFlowParams {
            top_module: "top".to_string(),
            device: "hx1k-tq144".to_string(),
            part: "ice40hx1k".to_string(),
            pcf: Some("top.pcf".into()),
            bit: None,
            verilog_files: vec!["top.v".to_string()],
        },
    )?;

    println!("bitstream: {}", report.bitstream.display());
    Ok(())
}
```

Individual stages
-----------------
```rust,no_run
use silkflow::{DesignOptions, Flow, FlowConfig, SystemRunner};

fn main() -> silkflow::Result<()> {
    let mut flow = Flow::new(FlowConfig::from_env()?, SystemRunner);
    let synth = flow.synth("top", &["top.v".to_string()])?;

    let opts = DesignOptions::new("top", "hx1k-tq144", synth.eblif);
    let net = flow.pack(&opts)?;
    println!("packed: {}", net.display());
    Ok(())
}
```

Error handling
--------------
All public functions return `silkflow::Result<T>`; match on `silkflow::Error`
to handle specific cases, e.g. a tool exiting with a non-zero status.

```rust,no_run
use silkflow::{Error, Flow, FlowConfig, SystemRunner};

fn main() {
    let mut flow = Flow::new(FlowConfig::from_env().unwrap(), SystemRunner);
    match flow.synth("top", &["top.v".to_string()]) {
        Ok(out) => println!("{}", out.eblif.display()),
        Err(Error::CommandFailed { command, .. }) => eprintln!("failed: {command}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: full flow and environment setup entry points.
- [`core`]: configuration, flow stages and diagnostic classification.
- [`io`]: process runner, toolchain file layout and archive extraction.
- [`types`]: `Architecture` and `Stage`.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Types
pub use crate::core::params::{BitstreamOptions, DesignOptions, FlowConfig};
pub use error::{Error, Result};
pub use types::{Architecture, Stage};

// Flow and diagnostics
pub use crate::core::diagnostics::{Diagnostic, DiagnosticClassifier, ErrorReporter};
pub use crate::core::flow::{Flow, SynthOutputs};

// Process and file helpers
pub use io::{ArchInfo, Capture, FileManager, Invocation, SystemRunner, ToolOutput, ToolRunner};

// High-level API re-exports
pub use api::{
    FamilyLayout, FlowReport, FullFlowParams, SetupParams, create_family_environment,
    run_full_flow, setup_environment,
};
