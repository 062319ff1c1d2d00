//! # Metadata Validation
//!
//! A group type's `metadata` section is itself typed: it must declare
//! `type: map` (or the namespaced `tosca:map`), and every entry that is a
//! nested schema must declare `type: string`. Scalar entries are free-form.
//!
//! Each offending declaration is recorded separately; nothing here aborts.

use tosca_core::{ErrorSink, ValidationError, Value};

/// Accepted values of the metadata block's own `type`.
pub const MAP_TYPES: [&str; 2] = ["map", "tosca:map"];

/// The only type a nested metadata entry may declare.
pub const STRING_TYPE: &str = "string";

/// Validate a metadata section belonging to `type_name`.
///
/// Returns the number of records pushed into `sink`.
pub fn validate_metadata(type_name: &str, metadata: &Value, sink: &mut dyn ErrorSink) -> usize {
    let what = format!("group type \"{type_name}\" metadata");

    let Some(entries) = metadata.as_mapping() else {
        sink.record(ValidationError::InvalidType {
            what,
            value: metadata.to_string(),
        });
        return 1;
    };

    let mut recorded = 0;
    let declared = entries.get("type");
    if !declared
        .and_then(Value::as_str)
        .is_some_and(|t| MAP_TYPES.contains(&t))
    {
        tracing::debug!(type_name, declared = %render(declared), "metadata is not declared as a map");
        sink.record(ValidationError::InvalidType {
            what: what.clone(),
            value: render(declared),
        });
        recorded += 1;
    }

    // Iterates every key, `type` included; only nested schemas are checked.
    for (key, entry) in entries {
        let Value::Mapping(schema) = entry else {
            continue;
        };
        let entry_type = schema.get("type");
        if entry_type.and_then(Value::as_str) != Some(STRING_TYPE) {
            sink.record(ValidationError::InvalidType {
                what: format!("{what} \"{key}\""),
                value: render(entry_type),
            });
            recorded += 1;
        }
    }
    recorded
}

fn render(declared: Option<&Value>) -> String {
    declared.map_or_else(|| "null".to_string(), Value::to_string)
}
