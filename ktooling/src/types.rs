//! Tool runtime context and execution result types.

use kprovider::ToolCall;

/// Per-call context handed to every tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolExecutionContext {
    /// Names of every tool registered with the runtime, in manifest order.
    pub registered_tools: Vec<String>,
}

impl ToolExecutionContext {
    pub fn new<I, S>(registered_tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registered_tools: registered_tools.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of one tool call. Exactly one of `result` and `error` is meaningful:
/// when `error` is set, `result` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionResult {
    pub tool_name: String,
    pub result: String,
    pub error: Option<String>,
}

impl ToolExecutionResult {
    pub fn success(tool_name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            result: result.into(),
            error: None,
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            result: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn from_call(call: &ToolCall, result: impl Into<String>) -> Self {
        Self::success(call.name.clone(), result)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Transcript entry appended for a tool call requested by a live backend.
    pub fn transcript_block(&self) -> String {
        match &self.error {
            Some(error) => format!("Tool `{}` failed: {error}", self.tool_name),
            None => format!(
                "Tool `{}` result:\n```\n{}\n```",
                self.tool_name, self.result
            ),
        }
    }

    /// Reply text composed for a tool short-circuited in simulated mode.
    pub fn simulated_text(&self) -> String {
        match &self.error {
            Some(error) => format!("Error: {error}"),
            None => self.result.clone(),
        }
    }
}
