//! The `manageMemory` tool declaration (§4.I) — the only documentation
//! surface the LLM sees besides the renderer's instructions block.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A function tool as declared to the LLM, mirroring the shape the wider
/// platform already uses for its own tool surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Build the `manageMemory` tool declaration. `minItems=1` on `ops` mirrors
/// the executor's refusal of an empty batch (`BatchError::EmptyBatch`).
pub fn build_tool() -> Tool {
    Tool {
        name: "manageMemory".to_string(),
        description: "Read and mutate the structured memory tree. Pass one or more ops; \
            each op is applied in order and never aborts the batch on failure."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "ops": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "action": {
                                "type": "string",
                                "enum": ["view", "hide", "set", "upsert", "add", "insert", "delete", "clear", "rename"]
                            },
                            "path": {
                                "type": "string",
                                "description": "JSON-Pointer-flavoured path; a trailing '*' is valid only on view/hide"
                            },
                            "paths": {
                                "type": "array",
                                "items": {"type": "string"},
                                "description": "Alternative to path for view/hide targeting multiple paths at once"
                            },
                            "value": {
                                "description": "The value to write; required by set/upsert/add/insert"
                            },
                            "index": {
                                "type": "integer",
                                "minimum": 0,
                                "description": "Array index; required by insert, used by set/upsert on arrayItem"
                            },
                            "key": {
                                "type": "string",
                                "description": "Map key or topic subtopic name; required by add on maps/topics"
                            },
                            "newKey": {
                                "type": "string",
                                "description": "Required by rename"
                            },
                            "page": {
                                "type": "object",
                                "properties": {
                                    "offset": {"type": "integer", "minimum": 0},
                                    "limit": {"type": "integer", "minimum": 1, "maximum": 500}
                                },
                                "description": "Optional pagination window applied by view"
                            },
                            "openChildren": {
                                "type": "boolean",
                                "description": "Overrides the default open-children behaviour of view"
                            }
                        },
                        "required": ["action"]
                    }
                }
            },
            "required": ["ops"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_min_items_one() {
        let tool = build_tool();
        assert_eq!(tool.name, "manageMemory");
        assert_eq!(tool.input_schema["properties"]["ops"]["minItems"], json!(1));
    }
}
