// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MCP tool catalog: the task tools plus a required `user_id` argument.

use std::collections::HashMap;

use serde_json::{Value, json};
use taskwright_agent::{ToolDispatcher, ToolKind};
use taskwright_core::TaskwrightError;

/// A tool's MCP schema and its compiled validator.
struct CatalogEntry {
    schema: Value,
    validator: jsonschema::Validator,
}

/// Schemas and validators for every exposed tool.
pub struct ToolCatalog {
    entries: HashMap<&'static str, CatalogEntry>,
}

/// Extends a tool's argument schema with the owning `user_id`.
pub fn mcp_input_schema(kind: ToolKind) -> Value {
    let mut schema = kind.input_schema();
    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        properties.insert(
            "user_id".to_string(),
            json!({
                "type": "string",
                "minLength": 1,
                "description": "User ID"
            }),
        );
    }
    if let Some(object) = schema.as_object_mut() {
        let required = object
            .entry("required")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Some(list) = required.as_array_mut() {
            list.insert(0, Value::String("user_id".to_string()));
        }
    }
    schema
}

impl ToolCatalog {
    pub fn new() -> Result<Self, TaskwrightError> {
        let mut entries = HashMap::new();
        for kind in ToolKind::ALL {
            let schema = mcp_input_schema(kind);
            let validator = jsonschema::validator_for(&schema).map_err(|e| {
                TaskwrightError::Internal(format!("invalid schema for {kind}: {e}"))
            })?;
            entries.insert(
                kind.name(),
                CatalogEntry {
                    schema,
                    validator,
                },
            );
        }
        Ok(Self { entries })
    }

    /// MCP `tools/list` entries, sorted by name.
    ///
    /// The agent's definitions with `input_schema` swapped for the
    /// camel-cased `inputSchema` carrying `user_id`.
    pub fn definitions(&self) -> Vec<Value> {
        ToolDispatcher::tool_definitions()
            .into_iter()
            .filter_map(|mut def| {
                let entry = self.entries.get(def["name"].as_str()?)?;
                let object = def.as_object_mut()?;
                object.remove("input_schema");
                object.insert("inputSchema".to_string(), entry.schema.clone());
                Some(def)
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Validates arguments for a known tool.
    ///
    /// Returns every violation; an unknown tool name yields no violations.
    pub fn validate(&self, name: &str, arguments: &Value) -> Vec<String> {
        let Some(entry) = self.entries.get(name) else {
            return Vec::new();
        };
        entry
            .validator
            .iter_errors(arguments)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect()
    }
}
