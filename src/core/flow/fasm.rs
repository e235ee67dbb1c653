use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use super::Flow;
use crate::core::params::DesignOptions;
use crate::error::Result;
use crate::io::process::ToolRunner;
use crate::types::Stage;

impl<R: ToolRunner> Flow<R> {
    /// Dump the routed design as FASM. Hand-written features in
    /// `<top>_fasm_extra.fasm` are appended when present.
    pub fn write_fasm(&mut self, opts: &DesignOptions) -> Result<PathBuf> {
        self.run_genfasm(Stage::WriteFasm, opts, &[])?;

        let fasm = PathBuf::from(format!("{}.fasm", opts.top_module));
        let fasm_extra = self.work_path(format!("{}_fasm_extra.fasm", opts.top_module));
        if fasm_extra.exists() {
            info!("Found fasm extra, concatenating with existing result…");
            let extra = fs::read(&fasm_extra)?;
            let mut out = OpenOptions::new()
                .append(true)
                .create(true)
                .open(self.work_path(&fasm))?;
            out.write_all(&extra)?;
        }

        info!("FASM: {}", fasm.display());
        Ok(fasm)
    }
}
