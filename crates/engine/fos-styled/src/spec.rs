//! Style Specification Model
//!
//! A specification maps variant keys (`base`, `em`, `em_hover`) to property
//! blocks. Property blocks are JSON objects whose keys are camelCase CSS
//! properties, or pseudo-class names holding a nested block.

use serde_json::{Map, Value};

use crate::error::{json_type_name, StyleError};

/// Key of the unconditional root block
pub const BASE_KEY: &str = "base";

/// Separator joining the parts of a compound variant key
pub const COMPOUND_SEPARATOR: char = '_';

/// Pseudo-classes recognised as nesting keys inside a property block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PseudoClass {
    // User action
    Hover,
    Focus,
    Active,

    // Input
    Checked,
    Default,
    Disabled,
    Enabled,
    Indeterminate,
    Invalid,
    Optional,
    Required,
    Valid,

    // Tree-structural
    Empty,
    FirstChild,
    FirstOfType,
    LastChild,
    LastOfType,
    OnlyChild,
    Root,
    Scope,

    // Other
    Fullscreen,
    Link,
    Target,
    Visited,
}

impl PseudoClass {
    /// Every recognised pseudo-class
    pub const ALL: [PseudoClass; 24] = [
        PseudoClass::Hover,
        PseudoClass::Focus,
        PseudoClass::Active,
        PseudoClass::Checked,
        PseudoClass::Default,
        PseudoClass::Disabled,
        PseudoClass::Enabled,
        PseudoClass::Indeterminate,
        PseudoClass::Invalid,
        PseudoClass::Optional,
        PseudoClass::Required,
        PseudoClass::Valid,
        PseudoClass::Empty,
        PseudoClass::FirstChild,
        PseudoClass::FirstOfType,
        PseudoClass::LastChild,
        PseudoClass::LastOfType,
        PseudoClass::OnlyChild,
        PseudoClass::Root,
        PseudoClass::Scope,
        PseudoClass::Fullscreen,
        PseudoClass::Link,
        PseudoClass::Target,
        PseudoClass::Visited,
    ];

    /// Parse a block key (camelCase)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }

    /// Key as written in a property block
    pub fn key(self) -> &'static str {
        match self {
            PseudoClass::Hover => "hover",
            PseudoClass::Focus => "focus",
            PseudoClass::Active => "active",
            PseudoClass::Checked => "checked",
            PseudoClass::Default => "default",
            PseudoClass::Disabled => "disabled",
            PseudoClass::Enabled => "enabled",
            PseudoClass::Indeterminate => "indeterminate",
            PseudoClass::Invalid => "invalid",
            PseudoClass::Optional => "optional",
            PseudoClass::Required => "required",
            PseudoClass::Valid => "valid",
            PseudoClass::Empty => "empty",
            PseudoClass::FirstChild => "firstChild",
            PseudoClass::FirstOfType => "firstOfType",
            PseudoClass::LastChild => "lastChild",
            PseudoClass::LastOfType => "lastOfType",
            PseudoClass::OnlyChild => "onlyChild",
            PseudoClass::Root => "root",
            PseudoClass::Scope => "scope",
            PseudoClass::Fullscreen => "fullscreen",
            PseudoClass::Link => "link",
            PseudoClass::Target => "target",
            PseudoClass::Visited => "visited",
        }
    }

    /// Name as written in a selector
    pub fn css_name(self) -> &'static str {
        match self {
            PseudoClass::FirstChild => "first-child",
            PseudoClass::FirstOfType => "first-of-type",
            PseudoClass::LastChild => "last-child",
            PseudoClass::LastOfType => "last-of-type",
            PseudoClass::OnlyChild => "only-child",
            other => other.key(),
        }
    }
}

/// A normalised variant key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantKey {
    /// Named parts, sorted; empty for `base`
    pub path: Vec<String>,
}

impl VariantKey {
    /// Split a key on the separator and sort its parts.
    ///
    /// `base` alone is the root path. `base` combined with anything else is
    /// an error. A key with no named part (`""`, `"_"`) names no variant and
    /// yields `None`.
    pub fn parse(key: &str) -> Result<Option<Self>, StyleError> {
        let mut parts: Vec<&str> = key
            .split(COMPOUND_SEPARATOR)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            return Ok(None);
        }

        if parts.contains(&BASE_KEY) {
            if parts.len() > 1 {
                return Err(StyleError::BaseInCompound {
                    key: key.to_string(),
                });
            }
            return Ok(Some(Self::base()));
        }

        parts.sort_unstable();
        parts.dedup();
        Ok(Some(Self {
            path: parts.into_iter().map(str::to_string).collect(),
        }))
    }

    pub fn base() -> Self {
        Self { path: Vec::new() }
    }

    pub fn is_base(&self) -> bool {
        self.path.is_empty()
    }
}

/// A style specification: variant key to property block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSpec {
    variants: Map<String, Value>,
}

impl StyleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a specification from JSON text
    pub fn parse(json: &str) -> Result<Self, StyleError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, StyleError> {
        match value {
            Value::Object(variants) => Ok(Self { variants }),
            other => Err(StyleError::NotAnObject {
                what: json_type_name(&other),
            }),
        }
    }

    pub fn from_map(variants: Map<String, Value>) -> Self {
        Self { variants }
    }

    /// A specification holding only a `base` block
    pub fn from_base(block: Map<String, Value>) -> Self {
        let mut variants = Map::new();
        variants.insert(BASE_KEY.to_string(), Value::Object(block));
        Self { variants }
    }

    /// Add or replace a variant block
    pub fn with_variant(mut self, key: impl Into<String>, block: Value) -> Self {
        self.variants.insert(key.into(), block);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variants.get(key)
    }

    pub fn has_base(&self) -> bool {
        self.variants.contains_key(BASE_KEY)
    }

    /// Variants in source order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variants.iter()
    }

    /// Variants sorted by key
    pub fn sorted(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.variants.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Serialization used for cache keys: variant keys sorted, blocks in
    /// source order since declaration order is significant
    pub fn canonical(&self) -> String {
        let mut out = String::from("{");
        for (i, (key, block)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&Value::String(key.clone()).to_string());
            out.push(':');
            out.push_str(&block.to_string());
        }
        out.push('}');
        out
    }
}

impl From<Map<String, Value>> for StyleSpec {
    fn from(variants: Map<String, Value>) -> Self {
        Self::from_map(variants)
    }
}
