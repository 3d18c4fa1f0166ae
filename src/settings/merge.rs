//! Deep merge of structured settings documents.
//!
//! [`merge`] is the generic rule: mappings recurse, sequences union, and
//! anything else is replaced by the overlay. [`merge_settings`] layers the
//! authoritative keys of a [`SettingsPolicy`] on top of it.
use serde::Deserialize;
use serde_json::{Map, Value};

/// Keys of a settings template that always win over the installed document.
///
/// This is an explicit enumeration. Keys not listed here follow the generic
/// "existing wins" rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPolicy {
    /// Top-level tables re-merged with the template as overlay (e.g. `env`).
    pub merge_tables: Vec<String>,
    /// `permissions` lists whose template elements are always present.
    pub permission_lists: Vec<String>,
    /// `permissions` scalars assigned straight from the template.
    pub permission_scalars: Vec<String>,
}

impl Default for SettingsPolicy {
    fn default() -> Self {
        Self {
            merge_tables: vec!["env".to_string()],
            permission_lists: ["allow", "deny", "ask"].map(String::from).to_vec(),
            permission_scalars: ["defaultMode", "disableBypassPermissionsMode"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Key of the permissions block.
pub const PERMISSIONS: &str = "permissions";
/// Key of the default model.
pub const MODEL: &str = "model";

/// Recursively merge `overlay` into `base`.
///
/// - both mappings: recurse per key
/// - both sequences: `base` followed by each `overlay` element not already present
/// - otherwise: `overlay` replaces `base`
#[must_use]
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => {
            let mut merged = b.clone();
            for (key, value) in o {
                let next = match merged.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (Value::Array(b), Value::Array(o)) => {
            let mut merged = b.clone();
            union_into(&mut merged, o);
            Value::Array(merged)
        }
        _ => overlay.clone(),
    }
}

/// Append each element of `extra` not already in `list`, in order.
///
/// Returns how many elements were appended.
pub fn union_into(list: &mut Vec<Value>, extra: &[Value]) -> usize {
    let mut added = 0;
    for item in extra {
        if !list.contains(item) {
            list.push(item.clone());
            added += 1;
        }
    }
    added
}

/// Merge a settings `template` with the `existing` installed document.
///
/// 1. `merge(template, existing)`: user customizations win in general.
/// 2. Each policy table is re-merged with the template's table as overlay.
/// 3. Template elements of each policy permission list are unioned in.
/// 4. Policy permission scalars are assigned from the template.
/// 5. `model`, when given, is set before merging and forced afterwards.
#[must_use]
pub fn merge_settings(
    template: &Value,
    existing: &Value,
    policy: &SettingsPolicy,
    model: Option<&str>,
) -> Value {
    let mut template = template.clone();
    if let (Some(model), Value::Object(t)) = (model, &mut template) {
        t.insert(MODEL.to_string(), Value::String(model.to_string()));
    }

    let mut merged = match merge(&template, existing) {
        Value::Object(map) => map,
        _ => return template,
    };

    for table in &policy.merge_tables {
        if let Some(authoritative) = template.get(table) {
            let current = merged
                .get(table)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            merged.insert(table.clone(), merge(&current, authoritative));
        }
    }

    if let Some(perms) = template.get(PERMISSIONS).and_then(Value::as_object)
        && let Some(target) = object_entry(&mut merged, PERMISSIONS)
    {
        for key in &policy.permission_lists {
            if let Some(Value::Array(items)) = perms.get(key)
                && let Some(list) = array_entry(target, key)
            {
                union_into(list, items);
            }
        }
        for key in &policy.permission_scalars {
            if let Some(value) = perms.get(key) {
                target.insert(key.clone(), value.clone());
            }
        }
    }

    if let Some(model) = model {
        merged.insert(MODEL.to_string(), Value::String(model.to_string()));
    }

    Value::Object(merged)
}

/// Return the mapping at `key`, replacing any non-mapping value.
pub(crate) fn object_entry<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Option<&'a mut Map<String, Value>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// Return the sequence at `key`, replacing any non-sequence value.
pub(crate) fn array_entry<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Option<&'a mut Vec<Value>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequences_union_without_duplicates() {
        let merged = merge(&json!(["a", "b"]), &json!(["b", "c"]));
        assert_eq!(merged, json!(["a", "b", "c"]));
    }

    #[test]
    fn mappings_recurse_and_overlay_scalars_win() {
        let base = json!({"a": 1, "nested": {"x": 1, "keep": true}});
        let overlay = json!({"a": 2, "nested": {"x": 2}, "new": "n"});
        assert_eq!(
            merge(&base, &overlay),
            json!({"a": 2, "nested": {"x": 2, "keep": true}, "new": "n"})
        );
    }

    #[test]
    fn type_mismatch_takes_overlay() {
        assert_eq!(merge(&json!({"a": [1]}), &json!({"a": "s"})), json!({"a": "s"}));
        assert_eq!(merge(&json!({"a": {"b": 1}}), &json!({"a": [1]})), json!({"a": [1]}));
    }

    #[test]
    fn every_key_from_either_side_survives() {
        let merged = merge(&json!({"t": 1}), &json!({"e": 2}));
        assert_eq!(merged, json!({"t": 1, "e": 2}));
    }

    #[test]
    fn user_scalars_win_outside_policy() {
        let template = json!({"theme": "dark", "permissions": {"allow": ["Read"]}});
        let existing = json!({"theme": "light"});
        let merged = merge_settings(&template, &existing, &SettingsPolicy::default(), None);
        assert_eq!(merged["theme"], "light");
        assert_eq!(merged["permissions"]["allow"], json!(["Read"]));
    }

    #[test]
    fn permission_lists_and_model_from_template() {
        let existing = json!({"model": "x", "permissions": {"allow": ["Read"]}});
        let template = json!({"model": "y", "permissions": {"allow": ["Read", "Grep"]}});
        let merged = merge_settings(&template, &existing, &SettingsPolicy::default(), Some("y"));
        assert_eq!(merged["permissions"]["allow"], json!(["Read", "Grep"]));
        assert_eq!(merged["model"], "y");
    }

    #[test]
    fn model_left_to_user_without_selection() {
        let existing = json!({"model": "x"});
        let template = json!({"model": "y"});
        let merged = merge_settings(&template, &existing, &SettingsPolicy::default(), None);
        assert_eq!(merged["model"], "x");
    }

    #[test]
    fn env_table_is_template_controlled() {
        let template = json!({"env": {"AWS_REGION": "us-east-1", "CLAUDE_CODE_USE_BEDROCK": "1"}});
        let existing = json!({"env": {"AWS_REGION": "eu-west-1", "MY_VAR": "mine"}});
        let merged = merge_settings(&template, &existing, &SettingsPolicy::default(), None);
        assert_eq!(
            merged["env"],
            json!({"AWS_REGION": "us-east-1", "MY_VAR": "mine", "CLAUDE_CODE_USE_BEDROCK": "1"})
        );
    }

    #[test]
    fn permission_scalars_are_assigned() {
        let template = json!({"permissions": {"defaultMode": "plan", "disableBypassPermissionsMode": "disable"}});
        let existing = json!({"permissions": {"defaultMode": "acceptEdits", "deny": ["Bash(rm:*)"]}});
        let merged = merge_settings(&template, &existing, &SettingsPolicy::default(), None);
        assert_eq!(merged["permissions"]["defaultMode"], "plan");
        assert_eq!(merged["permissions"]["disableBypassPermissionsMode"], "disable");
        assert_eq!(merged["permissions"]["deny"], json!(["Bash(rm:*)"]));
    }

    #[test]
    fn unlisted_permission_keys_follow_generic_rule() {
        let template = json!({"permissions": {"additionalDirectories": ["/a"], "custom": "t"}});
        let existing = json!({"permissions": {"custom": "e"}});
        let merged = merge_settings(&template, &existing, &SettingsPolicy::default(), None);
        assert_eq!(merged["permissions"]["custom"], "e");
        assert_eq!(merged["permissions"]["additionalDirectories"], json!(["/a"]));
    }

    #[test]
    fn non_object_permissions_are_replaced() {
        let template = json!({"permissions": {"allow": ["Read"]}});
        let existing = json!({"permissions": "broken"});
        let merged = merge_settings(&template, &existing, &SettingsPolicy::default(), None);
        assert_eq!(merged["permissions"]["allow"], json!(["Read"]));
    }

    #[test]
    fn remerging_template_keeps_authoritative_subtrees() {
        let template = json!({
            "env": {"A": "1"},
            "permissions": {"allow": ["Read"], "defaultMode": "plan"}
        });
        let existing = json!({
            "env": {"A": "user"},
            "permissions": {"allow": ["Write"], "defaultMode": "bypass"}
        });
        let policy = SettingsPolicy::default();
        let once = merge_settings(&template, &existing, &policy, None);
        let twice = merge_settings(&template, &once, &policy, None);
        assert_eq!(once, twice);
        assert_eq!(twice["env"]["A"], "1");
        assert_eq!(twice["permissions"]["defaultMode"], "plan");
        assert_eq!(twice["permissions"]["allow"], json!(["Read", "Write"]));
    }

    #[test]
    fn policy_deserializes_partial() {
        let p: SettingsPolicy = toml::from_str("merge_tables = [\"env\", \"hooks\"]").unwrap();
        assert_eq!(p.merge_tables, vec!["env", "hooks"]);
        assert_eq!(p.permission_lists.len(), 3);
    }
}
