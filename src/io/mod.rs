//! I/O layer: spawning external tools, locating files inside the toolchain
//! install, and extracting them from a `.tar.pixz` archive on demand.
pub mod archive;
pub use archive::extract_pixz;

pub mod files;
pub use files::{ArchInfo, FileManager};

pub mod process;
pub use process::{Capture, Invocation, SystemRunner, ToolOutput, ToolRunner};
