//! Merging a section value with the same section of an ancestor.

use tosca_core::Value;

/// Fold an ancestor's `inherited` value into `value`.
///
/// - No own value, or an own value that is null or an empty collection: the
///   ancestor's value is taken as is.
/// - Two mappings: the ancestor's keys are added where absent; own keys win.
/// - Two sequences: the ancestor's items are appended unless already present.
/// - Anything else: the own value wins.
pub(crate) fn merge_inherited(value: Option<Value>, inherited: &Value) -> Value {
    match (value, inherited) {
        (None, inherited) => inherited.clone(),
        (Some(own), inherited) if own.is_empty() => inherited.clone(),
        (Some(Value::Mapping(mut own)), Value::Mapping(parent)) => {
            for (key, entry) in parent {
                own.entry(key.clone()).or_insert_with(|| entry.clone());
            }
            Value::Mapping(own)
        }
        (Some(Value::Sequence(mut own)), Value::Sequence(parent)) => {
            for item in parent {
                if !own.contains(item) {
                    own.push(item.clone());
                }
            }
            Value::Sequence(own)
        }
        (Some(own), _) => own,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(source: &str) -> Value {
        Value::from_yaml_str(source, "inline").unwrap()
    }

    #[test]
    fn test_absent_value_takes_the_ancestor() {
        let parent = yaml("a: 1\n");
        assert_eq!(merge_inherited(None, &parent), parent);
    }

    #[test]
    fn test_own_mapping_keys_win() {
        let own = yaml("host:\n  type: x.Own\n");
        let parent = yaml("host:\n  type: x.Parent\nscale:\n  type: x.Scale\n");
        let merged = merge_inherited(Some(own), &parent);
        assert_eq!(
            merged.get("host").and_then(|h| h.get("type")).and_then(Value::as_str),
            Some("x.Own")
        );
        assert!(merged.get("scale").is_some());
    }

    #[test]
    fn test_sequences_are_unioned_in_order() {
        let own = yaml("- a\n- b\n");
        let parent = yaml("- b\n- c\n");
        assert_eq!(merge_inherited(Some(own), &parent), yaml("- a\n- b\n- c\n"));
    }

    #[test]
    fn test_empty_own_value_takes_the_ancestor() {
        let parent = yaml("host:\n  type: x.Parent\n");
        for own in [Value::null(), Value::Sequence(Vec::new()), yaml("{}")] {
            assert_eq!(merge_inherited(Some(own), &parent), parent);
        }
        let requirements = yaml("- storage: x.Attachment\n");
        assert_eq!(merge_inherited(Some(Value::null()), &requirements), requirements);
    }

    #[test]
    fn test_mismatched_shapes_keep_own() {
        let own = yaml("- a\n");
        let parent = yaml("a: 1\n");
        assert_eq!(merge_inherited(Some(own.clone()), &parent), own);
    }
}
