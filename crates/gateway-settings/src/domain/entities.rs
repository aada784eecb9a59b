//! Typed views over device and group entries.
//!
//! Entries live in the document under `devices.<ieee_addr>` and
//! `groups.<id>`.  Beyond `friendly_name` (and `retain` for devices) an entry
//! may carry any number of extra fields, so the views wrap the raw table and
//! expose accessors instead of forcing a fixed schema.  No defaults are
//! applied: a field missing from the file reads as `None`.  Both views
//! serialize as the bare entry table.

use serde::Serialize;
use toml::{Table, Value};

/// Hardware address identifying a device, e.g. `0x00158d0001e8a1b2`.
pub type DeviceKey = String;

/// Identifier of a group.  Numeric ids use their decimal string form.
pub type GroupKey = String;

/// Document key holding the device map.
pub const DEVICES_KEY: &str = "devices";
/// Document key holding the group map.
pub const GROUPS_KEY: &str = "groups";
/// Field holding the user-facing alias of a device or group.
pub const FRIENDLY_NAME: &str = "friendly_name";
/// Field controlling MQTT retain for a device.
pub const RETAIN: &str = "retain";

/// A device entry as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DeviceEntry(Table);

impl DeviceEntry {
    /// The entry written for a freshly added device: its friendly name is the
    /// hardware address itself and retain is off.
    pub fn new(key: &str) -> Self {
        let mut table = Table::new();
        table.insert(FRIENDLY_NAME.to_string(), Value::String(key.to_string()));
        table.insert(RETAIN.to_string(), Value::Boolean(false));
        Self(table)
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.0.get(FRIENDLY_NAME).and_then(Value::as_str)
    }

    pub fn retain(&self) -> Option<bool> {
        self.0.get(RETAIN).and_then(Value::as_bool)
    }

    /// Returns any field of the entry, including extra per-device options.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }
}

impl From<Table> for DeviceEntry {
    fn from(table: Table) -> Self {
        Self(table)
    }
}

impl From<DeviceEntry> for Value {
    fn from(entry: DeviceEntry) -> Self {
        Value::Table(entry.0)
    }
}

/// A group entry as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupEntry(Table);

impl GroupEntry {
    pub fn friendly_name(&self) -> Option<&str> {
        self.0.get(FRIENDLY_NAME).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }
}

impl From<Table> for GroupEntry {
    fn from(table: Table) -> Self {
        Self(table)
    }
}

/// Returns the key of the first entry whose `friendly_name` equals `name`.
///
/// Entries are scanned in the map's iteration order, so with duplicate
/// aliases the earliest entry wins.  Entries that are not tables are skipped.
pub fn find_by_friendly_name<'a>(entries: &'a Table, name: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|(_, entry)| {
            entry
                .as_table()
                .and_then(|t| t.get(FRIENDLY_NAME))
                .and_then(Value::as_str)
                == Some(name)
        })
        .map(|(key, _)| key.as_str())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        toml::from_str(text).expect("test fixture must be valid TOML")
    }

    #[test]
    fn test_new_device_entry_uses_key_as_friendly_name() {
        let entry = DeviceEntry::new("0x1");

        assert_eq!(entry.friendly_name(), Some("0x1"));
        assert_eq!(entry.retain(), Some(false));
        assert_eq!(entry.as_table().len(), 2);
    }

    #[test]
    fn test_device_entry_exposes_extra_fields() {
        let entry = DeviceEntry::from(parse(
            "friendly_name = \"lamp\"\nretain = true\nqos = 1\n",
        ));

        assert_eq!(entry.friendly_name(), Some("lamp"));
        assert_eq!(entry.retain(), Some(true));
        assert_eq!(entry.get("qos").and_then(Value::as_integer), Some(1));
    }

    #[test]
    fn test_device_entry_missing_fields_read_as_none() {
        let entry = DeviceEntry::from(Table::new());

        assert_eq!(entry.friendly_name(), None);
        assert_eq!(entry.retain(), None);
    }

    #[test]
    fn test_group_entry_friendly_name() {
        let entry = GroupEntry::from(parse("friendly_name = \"kitchen\"\n"));

        assert_eq!(entry.friendly_name(), Some("kitchen"));
    }

    #[test]
    fn test_device_entry_serializes_as_bare_table() {
        let entry = DeviceEntry::new("0x1");

        let text = toml::to_string(&entry).expect("serialize");

        let restored: Table = toml::from_str(&text).expect("deserialize");
        assert_eq!(&restored, entry.as_table());
        assert!(text.contains("friendly_name = \"0x1\""));
    }

    #[test]
    fn test_group_entry_serializes_as_bare_table() {
        let entry = GroupEntry::from(parse("friendly_name = \"kitchen\"\nretain = true\n"));

        let text = toml::to_string(&entry).expect("serialize");

        assert_eq!(toml::from_str::<Table>(&text).unwrap(), *entry.as_table());
    }

    #[test]
    fn test_find_by_friendly_name_returns_first_match_in_order() {
        // Arrange: two entries share an alias
        let devices = parse(
            "[b]\nfriendly_name = \"dup\"\n[a]\nfriendly_name = \"dup\"\n[c]\nfriendly_name = \"other\"\n",
        );

        // Act / Assert
        assert_eq!(find_by_friendly_name(&devices, "dup"), Some("b"));
        assert_eq!(find_by_friendly_name(&devices, "other"), Some("c"));
    }

    #[test]
    fn test_find_by_friendly_name_returns_none_without_match() {
        let devices = parse("[a]\nfriendly_name = \"x\"\n");

        assert_eq!(find_by_friendly_name(&devices, "missing"), None);
        assert_eq!(find_by_friendly_name(&Table::new(), "x"), None);
    }

    #[test]
    fn test_find_by_friendly_name_skips_non_table_entries() {
        let devices = parse("a = \"not-an-entry\"\n[b]\nfriendly_name = \"not-an-entry\"\n");

        assert_eq!(find_by_friendly_name(&devices, "not-an-entry"), Some("b"));
    }
}
