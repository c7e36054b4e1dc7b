//! Remote sessions over the system OpenSSH client.
//!
//! Each session multiplexes its commands and transfers over one control
//! master connection. Host keys are not verified: targets are freshly
//! discovered instances reached by private address.

mod command;
mod session;

pub use command::run_captured;
pub use session::{OpenSshSession, OpenSshShell, SshOptions};
