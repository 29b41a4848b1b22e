//! Tool calling types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation requested by the model.
///
/// # Examples
///
/// ```
/// use relay_core::ToolCall;
/// use serde_json::json;
///
/// let call = ToolCall::new("call_1", "read_file", json!({"path": "src/lib.rs"}));
/// assert_eq!(call.arguments["path"], "src/lib.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call identifier
    pub id: String,
    /// Name of the tool to run
    pub name: String,
    /// Structured arguments
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a tool call. Non-object argument values become an empty map.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool/function
    pub name: String,
    /// Human-readable description of what the tool does
    #[serde(default)]
    pub description: String,
    /// JSON Schema defining the parameters this tool accepts
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// How the model should pick tools.
///
/// # Examples
///
/// ```
/// use relay_core::ToolChoice;
///
/// assert_eq!(ToolChoice::parse("any"), ToolChoice::Required);
/// assert_eq!(ToolChoice::parse("grep"), ToolChoice::Tool("grep".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ToolChoice {
    /// Model decides
    #[display("auto")]
    Auto,
    /// Model must call some tool
    #[display("required")]
    Required,
    /// Model must not call tools
    #[display("none")]
    None,
    /// Model must call the named tool
    #[display("{}", _0)]
    Tool(String),
}

impl ToolChoice {
    /// Interpret a free-form choice string. Unknown values name a tool.
    pub fn parse(value: &str) -> Self {
        match value {
            "auto" => Self::Auto,
            "required" | "any" => Self::Required,
            "none" => Self::None,
            name => Self::Tool(name.to_string()),
        }
    }
}

impl Serialize for ToolChoice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ToolChoice {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}
