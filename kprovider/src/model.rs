//! Backend-agnostic request, response, model, and tool descriptor types.
//!
//! ```rust
//! use kprovider::{ChatRequest, Message, ProviderErrorKind, Role};
//!
//! let ok = ChatRequest::builder("llama3.1:8b")
//!     .message(Message::new(Role::User, "hello"))
//!     .temperature(0.7)
//!     .build();
//! assert!(ok.is_ok());
//!
//! let err = ChatRequest::builder("")
//!     .message(Message::new(Role::User, "hello"))
//!     .build()
//!     .expect_err("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use chrono::{DateTime, FixedOffset};
use kcommon::{GenerationOptions, Registry};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Wire-ready chat message. `images` holds bare base64 payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub images: Vec<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, payload: impl Into<String>) -> Self {
        self.images.push(payload.into());
        self
    }
}

/// Metadata for a model advertised by the backend's model listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub modified_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ModelDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            digest: String::new(),
            modified_at: String::new(),
            details: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = digest.into();
        self
    }

    pub fn with_modified_at(mut self, modified_at: impl Into<String>) -> Self {
        self.modified_at = modified_at.into();
        self
    }

    pub fn with_details(mut self, details: ModelDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Size in decimal gigabytes, as shown by model pickers.
    pub fn size_gb(&self) -> f64 {
        self.size as f64 / 1e9
    }

    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.modified_at).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

/// One property of a tool parameter schema. Object and array properties nest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(
        skip_serializing_if = "Registry::is_empty",
        serialize_with = "serialize_properties"
    )]
    pub properties: Registry<String, ParameterSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSpec>>,
}

impl ParameterSpec {
    pub fn new(kind: ParameterType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            allowed_values: Vec::new(),
            default: None,
            properties: Registry::new(),
            items: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParameterType::String, description)
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.properties.insert(name.into(), spec);
        self
    }

    pub fn with_items(mut self, spec: ParameterSpec) -> Self {
        self.items = Some(Box::new(spec));
        self
    }
}

/// Object-typed parameter schema for a tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSchema {
    /// Serialized in declaration order.
    pub properties: Registry<String, ParameterSpec>,
    pub required: Vec<String>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.properties.insert(name.into(), spec);
        self
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }
}

impl Serialize for ParameterSchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let field_count = if self.required.is_empty() { 2 } else { 3 };
        let mut state = serializer.serialize_struct("ParameterSchema", field_count)?;
        state.serialize_field("type", "object")?;
        state.serialize_field("properties", &OrderedProperties(&self.properties))?;
        if !self.required.is_empty() {
            state.serialize_field("required", &self.required)?;
        }
        state.end()
    }
}

struct OrderedProperties<'a>(&'a Registry<String, ParameterSpec>);

impl Serialize for OrderedProperties<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter())
    }
}

fn serialize_properties<S>(
    properties: &Registry<String, ParameterSpec>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    OrderedProperties(properties).serialize(serializer)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ParameterSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Renders the `{ "type": "function", "function": {...} }` manifest entry.
    pub fn manifest_entry(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": self,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub model: String,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
}

impl ChatRequest {
    pub fn builder(model: impl Into<String>) -> ChatRequestBuilder {
        ChatRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
            tools: Vec::new(),
        }
    }

    pub fn enable_streaming(mut self) -> Self {
        self.options.stream = true;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequestBuilder {
    model: String,
    messages: Vec<Message>,
    options: GenerationOptions,
    tools: Vec<ToolDefinition>,
}

impl ChatRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: GenerationOptions::default(),
            tools: Vec::new(),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.options.stream = stream;
        self
    }

    pub fn build(self) -> Result<ChatRequest, ProviderError> {
        let request = ChatRequest {
            model: self.model,
            messages: self.messages,
            options: self.options,
            tools: self.tools,
        };

        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entry_matches_function_tool_shape() {
        let definition = ToolDefinition::new(
            "get_current_time",
            "Get the current time",
            ParameterSchema::new().property(
                "format",
                ParameterSpec::string("Time format (12h or 24h)")
                    .with_enum(["12h", "24h"])
                    .with_default("24h"),
            ),
        );

        let entry = definition.manifest_entry();
        assert_eq!(entry["type"], "function");
        assert_eq!(entry["function"]["name"], "get_current_time");
        assert_eq!(entry["function"]["parameters"]["type"], "object");
        assert_eq!(
            entry["function"]["parameters"]["properties"]["format"]["enum"],
            serde_json::json!(["12h", "24h"])
        );
        assert_eq!(
            entry["function"]["parameters"]["properties"]["format"]["default"],
            "24h"
        );
        assert!(entry["function"]["parameters"].get("required").is_none());
    }

    #[test]
    fn nested_parameter_specs_serialize_properties_and_items() {
        let schema = ParameterSchema::new()
            .property(
                "filter",
                ParameterSpec::new(ParameterType::Object, "Search filter")
                    .with_property("extension", ParameterSpec::string("File extension")),
            )
            .property(
                "paths",
                ParameterSpec::new(ParameterType::Array, "Paths")
                    .with_items(ParameterSpec::string("A path")),
            )
            .required("paths");

        let value = serde_json::to_value(&schema).expect("schema should serialize");
        assert_eq!(
            value["properties"]["filter"]["properties"]["extension"]["type"],
            "string"
        );
        assert_eq!(value["properties"]["paths"]["items"]["type"], "string");
        assert_eq!(value["required"], serde_json::json!(["paths"]));
    }

    #[test]
    fn schema_properties_keep_declaration_order() {
        let schema = ParameterSchema::new()
            .property("query", ParameterSpec::string("Search text"))
            .property("path", ParameterSpec::string("Directory to search"))
            .property(
                "filter",
                ParameterSpec::new(ParameterType::Object, "Search filter")
                    .with_property("size", ParameterSpec::string("Size bound"))
                    .with_property("extension", ParameterSpec::string("File extension")),
            );

        let value = serde_json::to_value(&schema).expect("schema should serialize");
        let keys = value["properties"]
            .as_object()
            .expect("properties object")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["query", "path", "filter"]);

        let nested = value["properties"]["filter"]["properties"]
            .as_object()
            .expect("nested properties object")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(nested, vec!["size", "extension"]);

        let text = serde_json::to_string(&schema).expect("schema should serialize");
        let query_at = text.find("\"query\"").expect("query key");
        let path_at = text.find("\"path\"").expect("path key");
        assert!(query_at < path_at);
    }

    #[test]
    fn descriptor_helpers_report_size_and_timestamp() {
        let model = ModelDescriptor::new("llava:7b")
            .with_size(4_109_793_677)
            .with_modified_at("2024-01-14T15:45:00Z");

        assert!((model.size_gb() - 4.11).abs() < 0.01);
        assert!(model.modified_at().is_some());
        assert!(ModelDescriptor::new("x").modified_at().is_none());
    }

    #[test]
    fn request_validation_rejects_empty_messages_and_bad_temperature() {
        let empty = ChatRequest::builder("m").build().expect_err("no messages");
        assert_eq!(empty.message, "at least one message is required");

        let hot = ChatRequest::builder("m")
            .message(Message::new(Role::User, "hi"))
            .temperature(3.5)
            .build()
            .expect_err("temperature out of range");
        assert_eq!(hot.kind, crate::ProviderErrorKind::InvalidRequest);
    }
}
