pub(crate) mod commands;
pub(crate) mod format;

pub(crate) use commands::{handle_command, Session};
