use std::fs;
use std::path::PathBuf;

use tracing::info;

use super::Flow;
use crate::core::params::DesignOptions;
use crate::error::{Error, Result};
use crate::io::process::{Capture, ToolRunner};
use crate::types::Architecture;

impl<R: ToolRunner> Flow<R> {
    /// Turn the pin constraints into a placement file VPR can fix clusters
    /// with. Returns the path passed to `--fix_clusters`.
    pub fn generate_constraints(&mut self, opts: &DesignOptions) -> Result<PathBuf> {
        let arch = self.config.arch;
        let arch_info = self.files.arch_info(arch, &opts.device)?;
        let pin_map = self.files.pinmap(&arch_info, opts.part.as_deref())?;
        let python_env = self.files.python_env(arch)?;
        let net = opts.net_file();

        match arch {
            Architecture::Ice40 => {
                let ioplace = PathBuf::from(format!("{}.io.place", self.config.project));
                let inv = self
                    .tool("python3")
                    .arg(self.files.arch_script(arch, "ice40_create_ioplace.py"))
                    .arg("--blif")
                    .arg(&opts.eblif)
                    .arg("--net")
                    .arg(&net)
                    .arg("--map")
                    .arg(&pin_map)
                    .opt_arg("--pcf", opts.pcf.as_ref())
                    .arg("--out")
                    .arg(&ioplace)
                    .envs(&python_env);
                self.runner.run(&inv, Capture::Inherit)?;

                info!("I/O placement: {}", ioplace.display());
                Ok(ioplace)
            }
            Architecture::Xc7 => {
                let grid_map = arch_info
                    .vpr_grid_map
                    .clone()
                    .ok_or_else(|| Error::missing("vpr_grid_map"))?;

                let ioplace = PathBuf::from(format!("{}.ioplace", self.config.project));
                let ioplace_inv = self
                    .tool("python3")
                    .arg(self.files.script("create_ioplace.py"))
                    .arg("--blif")
                    .arg(&opts.eblif)
                    .arg("--net")
                    .arg(&net)
                    .arg("--map")
                    .arg(&pin_map)
                    .opt_arg("--pcf", opts.pcf.as_ref())
                    .envs(&python_env);
                let ioplace_data = self.runner.run(&ioplace_inv, Capture::Stdout)?;
                fs::write(self.work_path(&ioplace), &ioplace_data.stdout)?;

                let constraints = self.config.project_file("constraints.place");
                let constraints_inv = self
                    .tool("python3")
                    .arg(self.files.script("create_place_constraints.py"))
                    .arg("--blif")
                    .arg(&opts.eblif)
                    .arg("--net")
                    .arg(&net)
                    .arg("--vpr_grid_map")
                    .arg(&grid_map)
                    .arg("--input")
                    .arg(&ioplace)
                    .envs(&python_env);
                let constraints_data = self.runner.run(&constraints_inv, Capture::Stdout)?;
                fs::write(self.work_path(&constraints), &constraints_data.stdout)?;

                info!("Placement constraints: {}", constraints.display());
                Ok(constraints)
            }
        }
    }
}
