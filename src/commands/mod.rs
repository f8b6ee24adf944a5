mod scan_command;
pub use scan_command::*;
