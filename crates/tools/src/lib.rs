//! `tools` crate — the tool invocation gateway and the built-in tools.
//!
//! The workflow engine never knows what an action does. It hands a named
//! [`ToolInvocation`] to a [`ToolGateway`] and gets a [`ToolResult`] back.
//! [`ToolRegistry`] is the stock gateway: it dispatches by name to registered
//! [`Tool`] implementations.

pub mod builtin;
pub mod error;
pub mod mock;
pub mod registry;
pub mod traits;

pub use error::ToolError;
pub use registry::{ToolRegistry, ToolsConfig};
pub use traits::{Tool, ToolGateway, ToolInvocation, ToolResult};
