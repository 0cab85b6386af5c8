//! Per-stylesheet symbol tables.

use super::scan::{split_top_level, strip_flags, StyleSheet};

/// One binding of a name to an unresolved value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Name including its sigil: `$brand`, `@brand`, `--brand`, or
    /// `$map.key` for a map entry.
    pub name: String,
    /// Value expression text, flags stripped.
    pub value: String,
    /// Byte offset of the binding in its file.
    pub position: usize,
}

/// Ordered bindings of one stylesheet.
///
/// Lookups follow last-binding-before-use semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    bindings: Vec<Binding>,
}

impl SymbolTable {
    /// Builds the table from a scanned sheet, in document order.
    #[must_use]
    pub fn from_sheet(sheet: &StyleSheet) -> Self {
        let mut bindings = Vec::new();
        for decl in sheet.declarations() {
            if !is_binding_name(&decl.property) {
                continue;
            }
            let value = strip_flags(&decl.value);
            if let Some(entries) = map_entries(value) {
                for (key, entry) in entries {
                    bindings.push(Binding {
                        name: format!("{}.{key}", decl.property),
                        value: entry.to_string(),
                        position: decl.offset,
                    });
                }
            }
            bindings.push(Binding {
                name: decl.property.clone(),
                value: value.to_string(),
                position: decl.offset,
            });
        }
        Self { bindings }
    }

    /// Scans and builds the table for stylesheet text.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self::from_sheet(&StyleSheet::parse(content))
    }

    /// Latest binding of `name` strictly before `position`.
    #[must_use]
    pub fn latest_before(&self, name: &str, position: usize) -> Option<&Binding> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.name == name && b.position < position)
    }

    /// Latest binding of `name` anywhere in the file.
    #[must_use]
    pub fn latest(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().rev().find(|b| b.name == name)
    }

    /// All bindings in document order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if the file binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn is_binding_name(property: &str) -> bool {
    property.starts_with('$') || property.starts_with('@') || property.starts_with("--")
}

/// Splits a Sass map literal `(k: v, k2: v2)` into its entries.
fn map_entries(value: &str) -> Option<Vec<(&str, &str)>> {
    let inner = value.strip_prefix('(')?.strip_suffix(')')?;
    let entries: Vec<(&str, &str)> = split_top_level(inner)
        .into_iter()
        .filter_map(|entry| {
            let colon = super::scan::find_top_level(entry, b':')?;
            let key = entry[..colon].trim().trim_matches(|c| c == '"' || c == '\'');
            Some((key, entry[colon + 1..].trim()))
        })
        .collect();
    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}
