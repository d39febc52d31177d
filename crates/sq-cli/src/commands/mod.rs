//! CLI command implementations

pub(crate) mod common;
pub(crate) mod compile;
pub(crate) mod init;
pub(crate) mod ls;
pub(crate) mod release;
pub(crate) mod status;
