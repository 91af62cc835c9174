//! Tool definitions: the metadata an agent sees before calling a tool.

use serde::Serialize;
use serde_json::Value;

/// Behavior hints advertised alongside a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolAnnotations {
    /// The tool does not modify its environment.
    pub read_only: bool,
    /// The tool may overwrite or delete existing data.
    pub destructive: bool,
    /// Repeating a call with the same arguments has no additional effect.
    pub idempotent: bool,
    /// The tool talks to services outside this process.
    pub open_world: bool,
}

/// Metadata describing a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub output_schema: Value,
    pub annotations: ToolAnnotations,
}

impl ToolDefinition {
    /// Names of the required input properties.
    pub fn required_inputs(&self) -> Vec<&str> {
        self.input_schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_inputs() {
        let def = ToolDefinition {
            name: "demo",
            title: "Demo",
            description: "A demo tool",
            input_schema: json!({
                "type": "object",
                "properties": { "a": {"type": "string"}, "b": {"type": "string"} },
                "required": ["a"]
            }),
            output_schema: json!({"type": "object"}),
            annotations: ToolAnnotations {
                read_only: true,
                destructive: false,
                idempotent: true,
                open_world: false,
            },
        };

        assert_eq!(def.required_inputs(), vec!["a"]);
    }

    #[test]
    fn test_required_inputs_missing() {
        let def = ToolDefinition {
            name: "bare",
            title: "Bare",
            description: "No schema",
            input_schema: json!({}),
            output_schema: json!({}),
            annotations: ToolAnnotations {
                read_only: true,
                destructive: false,
                idempotent: true,
                open_world: false,
            },
        };
        assert!(def.required_inputs().is_empty());
    }
}
