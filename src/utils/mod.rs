// Shared byte-level helpers

pub mod encoding;
pub mod io;

pub use io::{le_u16, le_u32, read_or_eof, ReadOutcome};
