//! The six demonstration tools: file reading, directory listing, search,
//! time, date, and agent self-description.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ktooling::{MockFileSystem, SystemClock, builtin_registry};
//!
//! let registry = builtin_registry(Arc::new(MockFileSystem::default()), Arc::new(SystemClock));
//! assert_eq!(registry.len(), 6);
//! assert_eq!(registry.names()[0], "read_file");
//! ```

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use kprovider::{ParameterSchema, ParameterSpec, ToolDefinition};
use serde::Serialize;
use serde_json::Value;

use crate::{MockFileSystem, ToolError, ToolExecutionContext, ToolRegistry};
use crate::{optional_string, parse_json_object, required_string};

pub const READ_FILE: &str = "read_file";
pub const READ_DIRECTORY: &str = "read_directory";
pub const SEARCH_FILES: &str = "search_files";
pub const GET_CURRENT_TIME: &str = "get_current_time";
pub const GET_CURRENT_DATE: &str = "get_current_date";
pub const GET_AGENT_INFO: &str = "get_agent_info";

pub const AGENT_NAME: &str = "Ollama Agent";
pub const AGENT_VERSION: &str = "1.0.0";

/// Wall-clock source for the time and date tools.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local time of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Renders a time as `12h` (`2:05:09 PM`) or, for any other format, 24-hour.
pub fn format_time(now: &DateTime<FixedOffset>, format: &str) -> String {
    let rendered = match format {
        "12h" => now.format("%-I:%M:%S %p"),
        _ => now.format("%H:%M:%S"),
    };
    format!("Current time: {rendered}")
}

/// Renders a date as `us`, `eu`, `relative`, or, for any other format, ISO.
pub fn format_date(now: &DateTime<FixedOffset>, format: &str) -> String {
    let rendered = match format {
        "us" => now.format("%-m/%-d/%Y"),
        "eu" => now.format("%d/%m/%Y"),
        "relative" => now.format("%A, %B %-d, %Y"),
        _ => now.format("%Y-%m-%d"),
    };
    format!("Current date: {rendered}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentInfo<'a> {
    name: &'a str,
    version: &'a str,
    capabilities: [&'a str; 5],
    available_tools: &'a [String],
    status: &'a str,
}

pub fn agent_info(available_tools: &[String]) -> Result<String, ToolError> {
    let info = AgentInfo {
        name: AGENT_NAME,
        version: AGENT_VERSION,
        capabilities: [
            "File system operations",
            "Directory navigation",
            "File search",
            "Time and date queries",
            "Tool execution",
        ],
        available_tools,
        status: "Active and ready to assist",
    };

    serde_json::to_string_pretty(&info)
        .map_err(|err| ToolError::execution(format!("failed to render agent info: {err}")))
}

pub fn builtin_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            READ_FILE,
            "Read the contents of a file",
            ParameterSchema::new()
                .property("path", ParameterSpec::string("The file path to read"))
                .required("path"),
        ),
        ToolDefinition::new(
            READ_DIRECTORY,
            "List the contents of a directory",
            ParameterSchema::new().property(
                "path",
                ParameterSpec::string("The directory path to read").with_default("."),
            ),
        ),
        ToolDefinition::new(
            SEARCH_FILES,
            "Search for files by name or pattern",
            ParameterSchema::new()
                .property("query", ParameterSpec::string("The search query or pattern"))
                .property(
                    "path",
                    ParameterSpec::string("The directory to search in").with_default("."),
                )
                .required("query"),
        ),
        ToolDefinition::new(
            GET_CURRENT_TIME,
            "Get the current time",
            ParameterSchema::new().property(
                "format",
                ParameterSpec::string("Time format (12h or 24h)")
                    .with_enum(["12h", "24h"])
                    .with_default("24h"),
            ),
        ),
        ToolDefinition::new(
            GET_CURRENT_DATE,
            "Get the current date",
            ParameterSchema::new().property(
                "format",
                ParameterSpec::string("Date format")
                    .with_enum(["iso", "us", "eu", "relative"])
                    .with_default("iso"),
            ),
        ),
        ToolDefinition::new(
            GET_AGENT_INFO,
            "Get information about the current agent",
            ParameterSchema::new(),
        ),
    ]
}

/// Registers the built-in tools, in manifest order, over `fs` and `clock`.
pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    fs: Arc<MockFileSystem>,
    clock: Arc<dyn Clock>,
) {
    for definition in builtin_definitions() {
        let fs = Arc::clone(&fs);
        let clock = Arc::clone(&clock);
        let name = definition.name.clone();

        registry.register_sync_fn(definition, move |arguments, context| {
            dispatch(&name, &arguments, &context, &fs, clock.as_ref())
        });
    }
}

pub fn builtin_registry(fs: Arc<MockFileSystem>, clock: Arc<dyn Clock>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry, fs, clock);
    registry
}

fn dispatch(
    name: &str,
    arguments: &Value,
    context: &ToolExecutionContext,
    fs: &MockFileSystem,
    clock: &dyn Clock,
) -> Result<String, ToolError> {
    let args = parse_json_object(arguments)?;

    match name {
        READ_FILE => fs.read_file(&required_string(&args, "path")?),
        READ_DIRECTORY => fs.read_directory(&optional_string(&args, "path", ".")),
        SEARCH_FILES => Ok(fs.search(
            &required_string(&args, "query")?,
            &optional_string(&args, "path", "."),
        )),
        GET_CURRENT_TIME => Ok(format_time(
            &clock.now(),
            &optional_string(&args, "format", "24h"),
        )),
        GET_CURRENT_DATE => Ok(format_date(
            &clock.now(),
            &optional_string(&args, "format", "iso"),
        )),
        GET_AGENT_INFO => agent_info(&context.registered_tools),
        other => Err(ToolError::not_found(format!("Unknown tool: {other}"))),
    }
}
