use std::fs;
use std::path::PathBuf;

use tracing::info;

use super::Flow;
use super::vpr::device_base;
use crate::core::params::BitstreamOptions;
use crate::error::{Error, Result};
use crate::io::process::{Capture, ToolRunner};
use crate::types::Architecture;

impl<R: ToolRunner> Flow<R> {
    /// Assemble the FASM into a device bitstream. Returns the bitstream path.
    pub fn write_bitstream(&mut self, opts: &BitstreamOptions) -> Result<PathBuf> {
        let arch = self.config.arch;
        match arch {
            Architecture::Ice40 => {
                let python_env = self.files.python_env(arch)?;
                let asc = PathBuf::from(format!("{}.asc", opts.top_module));

                let fasm2asc = self
                    .tool("python3")
                    .arg(self.files.arch_script(arch, "fasm_icebox/fasm2asc.py"))
                    .arg("--device")
                    .arg(device_base(&opts.device))
                    .arg(&opts.fasm)
                    .arg(&asc)
                    .envs(&python_env);
                self.runner.run(&fasm2asc, Capture::Inherit)?;

                let icepack = self.tool("icepack").arg(&asc).envs(&python_env);
                let bitstream = self.runner.run(&icepack, Capture::Stdout)?;

                let bit = opts.bitstream_file();
                fs::write(self.work_path(&bit), &bitstream.stdout)?;
                info!("Bitstream: {} ({} bytes)", bit.display(), bitstream.stdout.len());
                Ok(bit)
            }
            Architecture::Xc7 => Err(Error::NotImplemented(format!(
                "write_bitstream for {}",
                arch
            ))),
        }
    }
}
