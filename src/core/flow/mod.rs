//! The flow stages. Each stage builds the tool invocations for one step,
//! runs them in the configured working directory, and returns the path of
//! the artifact the next stage consumes.
pub mod bitstream;
pub mod constraints;
pub mod fasm;
pub mod synth;
pub mod vpr;

use std::path::{Path, PathBuf};

use crate::core::diagnostics::ErrorReporter;
use crate::core::params::FlowConfig;
use crate::io::files::FileManager;
use crate::io::process::{Invocation, ToolRunner};
use crate::types::Stage;

pub use synth::SynthOutputs;

pub struct Flow<R: ToolRunner> {
    config: FlowConfig,
    files: FileManager,
    runner: R,
    /// Diagnostics classified during the last synthesis
    diagnostics: ErrorReporter,
}

impl<R: ToolRunner> Flow<R> {
    pub fn new(config: FlowConfig, runner: R) -> Self {
        let files = FileManager::new(config.base_dir.clone(), config.archive.clone());
        Self {
            config,
            files,
            runner,
            diagnostics: ErrorReporter::new(),
        }
    }

    /// Replace the file manager derived from the configuration, e.g. to
    /// search a different tool path.
    pub fn with_file_manager(mut self, files: FileManager) -> Self {
        self.files = files;
        self
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &ErrorReporter {
        &self.diagnostics
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Invocation that runs inside the working directory.
    fn tool<S: AsRef<std::ffi::OsStr>>(&self, program: S) -> Invocation {
        Invocation::new(program).current_dir(&self.config.work_dir)
    }

    fn work_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.config.in_work_dir(path)
    }

    /// `<project>_<stage>.log`
    fn stage_log(&self, stage: Stage) -> PathBuf {
        self.config
            .project_file(&format!("{}.log", stage.command_name()))
    }

    /// `<project>_noisy_warnings_<stage>.log`
    fn noisy_warnings_log(&self, stage: Stage) -> PathBuf {
        self.config
            .project_file(&format!("noisy_warnings_{}.log", stage.command_name()))
    }
}
