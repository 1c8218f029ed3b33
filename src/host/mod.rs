//! Host bridge - exposes the plugin to an agent host over JSON-RPC on stdio
//!
//! The host forwards tool calls, turn hooks and the `/brain` command; the
//! plugin answers each on one line.

mod plugin;
pub mod protocol;
mod server;

pub use plugin::BrainGuardPlugin;
pub use server::{run_stdio, serve};
