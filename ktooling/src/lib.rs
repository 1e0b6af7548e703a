//! Capability layer for registering and executing tools.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ktooling::{DefaultToolRuntime, MockFileSystem, SystemClock, ToolRuntime, builtin_registry};
//!
//! let registry = builtin_registry(Arc::new(MockFileSystem::default()), Arc::new(SystemClock));
//! let runtime = DefaultToolRuntime::new(Arc::new(registry));
//! assert_eq!(runtime.definitions().len(), 6);
//! ```

mod args;
mod builtin;
mod error;
mod fixture;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        Clock, DefaultToolRuntime, MockFileSystem, Tool, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime,
        ToolRuntimeHooks,
    };
}

pub use args::{optional_string, parse_json_object, required_string};
pub use builtin::{
    AGENT_NAME, AGENT_VERSION, Clock, FixedClock, GET_AGENT_INFO, GET_CURRENT_DATE,
    GET_CURRENT_TIME, READ_DIRECTORY, READ_FILE, SEARCH_FILES, SystemClock, agent_info,
    builtin_definitions, builtin_registry, format_date, format_time, register_builtin_tools,
};
pub use error::{ToolError, ToolErrorKind};
pub use fixture::{FsNode, MockFileSystem};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
