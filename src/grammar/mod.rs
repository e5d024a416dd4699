//! Grammar and railroad text sources
//!
//! Both kinds of file are split into named parts. Railroad parts are
//! embedded as they are; grammar parts are piped through an external
//! renderer started by [`ProcessLauncher`].

pub mod parts;
pub mod process;

pub use parts::{PartSyntax, TextParts};
pub use process::{split_args, ProcessLauncher};
