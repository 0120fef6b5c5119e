//! Sandbox server
//!
//! An in-process stand-in for the remote API, used by tests and by the
//! CLI's `--sandbox` mode. Supports every service the client speaks, with
//! failure injection and a call log for assertions.

mod failure;
mod server;
mod state;

pub use failure::{FailureConfig, FailureInjector};
pub use server::{CallRecord, DemoSeed, SandboxServer};
pub use state::{SandboxJob, SandboxState};
