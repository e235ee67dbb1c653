use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use silkflow::{
    BitstreamOptions, DesignOptions, Flow, FlowConfig, SystemRunner, run_full_flow,
    setup_environment,
};

use super::args::{CliArgs, Commands};
use super::errors::AppError;

const LOG_ENV: &str = "SILKFLOW_LOG";

fn init_logging(verbose: bool) -> Result<(), AppError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    init_logging(args.verbose)?;

    let config = FlowConfig::with_overrides(args.arch, args.base, args.archive)?;
    debug!("Configuration: {:?}", config);

    let mut flow = Flow::new(config, SystemRunner);

    match args.command {
        Commands::Synth(synth) => {
            let out = flow.synth(&synth.top_module, &synth.verilog_files)?;
            info!("Wrote {} and {}", out.json.display(), out.eblif.display());
        }
        Commands::Pack(vpr) => {
            flow.pack(&DesignOptions::from(vpr))?;
        }
        Commands::GenerateConstraints(vpr) => {
            flow.generate_constraints(&DesignOptions::from(vpr))?;
        }
        Commands::Place(vpr) => {
            flow.place(&DesignOptions::from(vpr))?;
        }
        Commands::Route(vpr) => {
            flow.route(&DesignOptions::from(vpr))?;
        }
        Commands::WriteFasm(vpr) => {
            flow.write_fasm(&DesignOptions::from(vpr))?;
        }
        Commands::WriteBitstream(bit) => {
            flow.write_bitstream(&BitstreamOptions::from(bit))?;
        }
        Commands::Run(run) => {
            let report = run_full_flow(&mut flow, &run.flow_params())?;
            if let Some(path) = &run.report {
                report.write_json(path)?;
                info!("Run summary written to {}", path.display());
            }
        }
        Commands::Setup(setup) => {
            let mut runner = SystemRunner;
            let rc = setup_environment(&mut runner, &setup.into())?;
            info!("Source {} to use this toolchain", rc.display());
        }
    }

    Ok(())
}
