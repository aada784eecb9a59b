//! The configuration document and the pure operations over it.
//!
//! A document is a [`Table`]: string keys mapping to scalars, arrays or
//! further tables, nested arbitrarily.  Three operations matter to the store:
//!
//! - [`merge`] layers one table over another without mutating either input.
//!   Nested tables merge key by key; every other value in the overlay
//!   (scalars *and* arrays) replaces the base value outright.
//! - [`set_path`] assigns a value at a path of keys, creating intermediate
//!   tables on the way down.
//! - [`is_truthy`] decides whether a value counts as "set" for update-only
//!   option changes.

use thiserror::Error;
use toml::{Table, Value};

/// A configuration document.
pub type Document = Table;

/// Error type for path assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// `set_path` was called with no segments.
    #[error("path must contain at least one segment")]
    EmptyPath,

    /// An intermediate segment holds a truthy scalar or an array.
    #[error("cannot descend into `{segment}`: existing value is not a table")]
    NotATable { segment: String },
}

/// Returns a new table holding `base` with `overlay` merged over it.
///
/// Overlay values win at every depth.  Neither input is modified and the
/// result shares no structure with them.
pub fn merge(base: &Table, overlay: &Table) -> Table {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay);
    merged
}

fn merge_into(target: &mut Table, overlay: &Table) {
    for (key, value) in overlay {
        match (target.get_mut(key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                merge_into(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Assigns `value` at `path` inside `document`.
///
/// Missing intermediate segments, and intermediates holding a falsy value
/// (`false`, `0`, `""`), are replaced by empty tables.  On error the document
/// is left exactly as it was.
///
/// # Errors
///
/// - [`DocumentError::EmptyPath`] when `path` is empty.
/// - [`DocumentError::NotATable`] when an intermediate segment already holds
///   a truthy non-table value.
pub fn set_path(document: &mut Table, path: &[&str], value: Value) -> Result<(), DocumentError> {
    match path {
        [] => Err(DocumentError::EmptyPath),
        [last] => {
            document.insert((*last).to_string(), value);
            Ok(())
        }
        [head, rest @ ..] => match document.get_mut(*head) {
            Some(Value::Table(child)) => set_path(child, rest, value),
            Some(existing) if is_truthy(existing) => Err(DocumentError::NotATable {
                segment: (*head).to_string(),
            }),
            // Missing or falsy: replaced by a fresh table.
            _ => {
                // Build the subtree off to the side; nothing below a fresh
                // table can conflict, so this insert always happens.
                let mut child = Table::new();
                set_path(&mut child, rest, value)?;
                document.insert((*head).to_string(), Value::Table(child));
                Ok(())
            }
        },
    }
}

/// Returns `true` when `value` counts as set.
///
/// `false`, `0`, `0.0`, NaN and the empty string are falsy.  Everything else,
/// including empty arrays and empty tables, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Datetime(_) | Value::Array(_) | Value::Table(_) => true,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        toml::from_str(text).expect("test fixture must be valid TOML")
    }

    // ── merge ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_merge_overlay_scalar_wins_at_nested_depth() {
        // Arrange
        let base = parse("[advanced]\nchannel = 11\nbaudrate = 115200\n");
        let overlay = parse("[advanced]\nchannel = 25\n");

        // Act
        let merged = merge(&base, &overlay);

        // Assert
        let advanced = merged["advanced"].as_table().unwrap();
        assert_eq!(advanced["channel"].as_integer(), Some(25));
        assert_eq!(advanced["baudrate"].as_integer(), Some(115200));
    }

    #[test]
    fn test_merge_arrays_are_replaced_not_concatenated() {
        let base = parse("list = [1, 2, 3]\n");
        let overlay = parse("list = [9]\n");

        let merged = merge(&base, &overlay);

        assert_eq!(merged["list"], Value::Array(vec![Value::Integer(9)]));
    }

    #[test]
    fn test_merge_keeps_keys_only_present_in_overlay() {
        let base = parse("permit_join = false\n");
        let overlay = parse("[devices.'0x1']\nfriendly_name = \"lamp\"\n");

        let merged = merge(&base, &overlay);

        assert_eq!(merged["permit_join"].as_bool(), Some(false));
        assert!(merged.contains_key("devices"));
    }

    #[test]
    fn test_merge_scalar_overlay_replaces_base_table() {
        let base = parse("[mqtt]\ninclude_device_information = false\n");
        let overlay = parse("mqtt = \"disabled\"\n");

        let merged = merge(&base, &overlay);

        assert_eq!(merged["mqtt"].as_str(), Some("disabled"));
    }

    #[test]
    fn test_merge_table_overlay_replaces_base_scalar() {
        let base = parse("mqtt = 1\n");
        let overlay = parse("[mqtt]\nbase_topic = \"gw\"\n");

        let merged = merge(&base, &overlay);

        assert_eq!(
            merged["mqtt"].as_table().unwrap()["base_topic"].as_str(),
            Some("gw")
        );
    }

    #[test]
    fn test_merge_does_not_modify_inputs() {
        // Arrange
        let base = parse("[advanced]\nchannel = 11\n");
        let overlay = parse("[advanced]\nchannel = 15\n[extra]\nx = 1\n");
        let base_before = base.clone();
        let overlay_before = overlay.clone();

        // Act
        let mut merged = merge(&base, &overlay);
        merged.insert("permit_join".to_string(), Value::Boolean(true));
        if let Some(Value::Table(advanced)) = merged.get_mut("advanced") {
            advanced.insert("channel".to_string(), Value::Integer(20));
        }

        // Assert
        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    // ── set_path ──────────────────────────────────────────────────────────────

    #[test]
    fn test_set_path_creates_missing_intermediate_tables() {
        let mut doc = Table::new();

        set_path(&mut doc, &["advanced", "network", "channel"], Value::Integer(15)).unwrap();

        let network = doc["advanced"].as_table().unwrap()["network"]
            .as_table()
            .unwrap();
        assert_eq!(network["channel"].as_integer(), Some(15));
    }

    #[test]
    fn test_set_path_overwrites_existing_leaf() {
        let mut doc = parse("permit_join = false\n");

        set_path(&mut doc, &["permit_join"], Value::Boolean(true)).unwrap();

        assert_eq!(doc["permit_join"].as_bool(), Some(true));
    }

    #[test]
    fn test_set_path_leaves_sibling_keys_untouched() {
        let mut doc = parse("[mqtt]\nbase_topic = \"gw\"\nserver = \"mqtt://localhost\"\n");

        set_path(&mut doc, &["mqtt", "base_topic"], Value::from("home")).unwrap();

        let mqtt = doc["mqtt"].as_table().unwrap();
        assert_eq!(mqtt["base_topic"].as_str(), Some("home"));
        assert_eq!(mqtt["server"].as_str(), Some("mqtt://localhost"));
    }

    #[test]
    fn test_set_path_can_replace_a_table_leaf_with_a_scalar() {
        let mut doc = parse("[experimental]\nlivolo = false\n");

        set_path(&mut doc, &["experimental"], Value::Boolean(false)).unwrap();

        assert_eq!(doc["experimental"].as_bool(), Some(false));
    }

    #[test]
    fn test_set_path_rejects_empty_path() {
        let mut doc = Table::new();

        let result = set_path(&mut doc, &[], Value::Boolean(true));

        assert_eq!(result, Err(DocumentError::EmptyPath));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_set_path_rejects_descending_into_scalar_without_side_effects() {
        // Arrange
        let mut doc = parse("permit_join = true\n");
        let before = doc.clone();

        // Act
        let result = set_path(&mut doc, &["permit_join", "nested", "x"], Value::Integer(1));

        // Assert
        assert_eq!(
            result,
            Err(DocumentError::NotATable {
                segment: "permit_join".to_string()
            })
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_path_replaces_falsy_intermediates_with_tables() {
        // Arrange
        let mut doc = parse("experimental = false\nchannel = 0\nname = \"\"\n");

        // Act
        set_path(&mut doc, &["experimental", "livolo"], Value::Boolean(true)).unwrap();
        set_path(&mut doc, &["channel", "x"], Value::Integer(1)).unwrap();
        set_path(&mut doc, &["name", "a", "b"], Value::from("c")).unwrap();

        // Assert
        assert_eq!(doc["experimental"]["livolo"].as_bool(), Some(true));
        assert_eq!(doc["channel"]["x"].as_integer(), Some(1));
        assert_eq!(doc["name"]["a"]["b"].as_str(), Some("c"));
    }

    #[test]
    fn test_set_path_rejects_descending_into_array() {
        let mut doc = parse("list = []\n");

        let result = set_path(&mut doc, &["list", "x"], Value::Integer(1));

        assert!(matches!(result, Err(DocumentError::NotATable { .. })));
        assert_eq!(doc["list"], Value::Array(Vec::new()));
    }

    // ── is_truthy ─────────────────────────────────────────────────────────────

    #[test]
    fn test_is_truthy_falsy_values() {
        assert!(!is_truthy(&Value::Boolean(false)));
        assert!(!is_truthy(&Value::Integer(0)));
        assert!(!is_truthy(&Value::Float(0.0)));
        assert!(!is_truthy(&Value::Float(f64::NAN)));
        assert!(!is_truthy(&Value::String(String::new())));
    }

    #[test]
    fn test_is_truthy_truthy_values() {
        assert!(is_truthy(&Value::Boolean(true)));
        assert!(is_truthy(&Value::Integer(-1)));
        assert!(is_truthy(&Value::Float(0.5)));
        assert!(is_truthy(&Value::from("0")));
        assert!(is_truthy(&Value::Array(Vec::new())));
        assert!(is_truthy(&Value::Table(Table::new())));
    }
}
