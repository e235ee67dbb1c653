//! Core building blocks: configuration, the flow stages and their argument
//! builders, and diagnostic classification. These are the primitives
//! consumed by the high-level `api` module.
pub mod diagnostics;
pub mod flow;
pub mod params;
