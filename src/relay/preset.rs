//! Named header overlays selectable by the caller.

use std::collections::BTreeMap;

/// Header overlay applied on top of caller headers.
pub type Overlay = BTreeMap<String, String>;

/// Read-only table of presets, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetTable {
    entries: BTreeMap<String, Overlay>,
}

impl PresetTable {
    /// Presets compiled into the binary.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "mp".to_string(),
            Overlay::from([("Referer".to_string(), "https://mp.weixin.qq.com".to_string())]),
        );
        Self { entries }
    }

    /// Builtin presets with configured ones layered on top. A configured
    /// preset replaces a builtin of the same name entirely.
    pub fn with_overrides(overrides: &BTreeMap<String, Overlay>) -> Self {
        let mut table = Self::builtin();
        for (name, overlay) in overrides {
            table.entries.insert(name.clone(), overlay.clone());
        }
        table
    }

    pub fn get(&self, name: &str) -> Option<&Overlay> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
