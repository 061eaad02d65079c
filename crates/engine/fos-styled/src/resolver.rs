//! Class Name Resolver
//!
//! Maps a runtime variant selection onto the compiled mapping tree.
//! Classes come out in the order the caller listed the variants, not the
//! order of the tree.

use serde_json::Value;

use crate::compiler::ClassMapping;
use crate::rtl::RTL_CLASS;

/// Ordered variant flags supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSelection {
    flags: Vec<(String, bool)>,
}

impl VariantSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, variant: impl Into<String>, enabled: bool) -> Self {
        self.set(variant, enabled);
        self
    }

    /// Set a flag; a repeated variant keeps its first position
    pub fn set(&mut self, variant: impl Into<String>, enabled: bool) {
        let variant = variant.into();
        match self.flags.iter_mut().find(|(name, _)| *name == variant) {
            Some(entry) => entry.1 = enabled,
            None => self.flags.push((variant, enabled)),
        }
    }

    /// Read flags from a JSON object, in key order. Values are truthy unless
    /// null, false, 0 or the empty string.
    pub fn from_value(value: &Value) -> Self {
        let mut selection = Self::new();
        if let Value::Object(map) = value {
            for (variant, flag) in map {
                selection.set(variant.clone(), is_truthy(flag));
            }
        }
        selection
    }

    /// Enabled variants in caller order
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_enabled(&self, variant: &str) -> bool {
        self.flags.iter().any(|(name, enabled)| name == variant && *enabled)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for VariantSelection {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (variant, enabled) in iter {
            selection.set(variant, enabled);
        }
        selection
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Companion options for a resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Append the RTL marker class
    pub right_to_left: bool,
    /// Extra class appended last
    pub class_name: Option<&'a str>,
}

impl<'a> ResolveOptions<'a> {
    pub fn rtl() -> Self {
        Self {
            right_to_left: true,
            class_name: None,
        }
    }

    pub fn with_class(mut self, class_name: &'a str) -> Self {
        self.class_name = Some(class_name);
        self
    }
}

/// Resolve a selection to the ordered, deduplicated class list
pub fn resolve(mapping: &ClassMapping, selection: &VariantSelection, options: &ResolveOptions<'_>) -> Vec<String> {
    let mut classes = Vec::new();
    collect(mapping, selection, &mut classes);

    if options.right_to_left {
        classes.push(RTL_CLASS.to_string());
    }
    if let Some(extra) = options.class_name.filter(|c| !c.is_empty()) {
        classes.push(extra.to_string());
    }
    classes
}

/// Resolve and join with spaces, ready for a `class` attribute
pub fn class_string(mapping: &ClassMapping, selection: &VariantSelection, options: &ResolveOptions<'_>) -> String {
    resolve(mapping, selection, options).join(" ")
}

fn collect(node: &ClassMapping, selection: &VariantSelection, out: &mut Vec<String>) {
    if let Some(class_name) = &node.class_name {
        if !out.contains(class_name) {
            out.push(class_name.clone());
        }
    }

    for variant in selection.enabled() {
        if let Some(child) = node.then.get(variant) {
            collect(child, selection, out);
        }
    }
}
