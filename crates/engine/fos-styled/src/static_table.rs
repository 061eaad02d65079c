//! Precompiled Static Styles
//!
//! Properties with a small enumerable value domain are compiled once, for
//! every state, with `!important`. Lookups never compile.

use std::collections::HashMap;

use serde_json::json;

use crate::codec::hyphenate;
use crate::compiler::{CompiledRule, VariantCompiler};
use crate::error::StyleError;
use crate::spec::{PseudoClass, StyleSpec, BASE_KEY};

/// Enumerable property domains
pub const STATIC_DOMAIN: &[(&str, &[&str])] = &[
    ("display", &["none", "block", "inline", "inline-block", "flex", "inline-flex", "grid", "contents"]),
    ("position", &["static", "relative", "absolute", "fixed", "sticky"]),
    ("flexDirection", &["row", "row-reverse", "column", "column-reverse"]),
    ("flexWrap", &["nowrap", "wrap", "wrap-reverse"]),
    ("alignItems", &["flex-start", "flex-end", "center", "baseline", "stretch"]),
    ("justifyContent", &["flex-start", "flex-end", "center", "space-between", "space-around", "space-evenly"]),
    ("textAlign", &["left", "right", "center", "justify"]),
    ("overflow", &["visible", "hidden", "scroll", "auto"]),
    ("visibility", &["visible", "hidden"]),
    ("cursor", &["auto", "default", "pointer", "text", "move", "not-allowed"]),
    ("whiteSpace", &["normal", "nowrap", "pre", "pre-wrap"]),
    ("fontStyle", &["normal", "italic"]),
];

/// State a static class applies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticState {
    Base,
    Hover,
    Focus,
    Active,
    Disabled,
}

impl StaticState {
    pub const ALL: [StaticState; 5] = [
        StaticState::Base,
        StaticState::Hover,
        StaticState::Focus,
        StaticState::Active,
        StaticState::Disabled,
    ];

    /// Pseudo-class the state compiles to
    pub fn pseudo_class(self) -> Option<PseudoClass> {
        match self {
            StaticState::Base => None,
            StaticState::Hover => Some(PseudoClass::Hover),
            StaticState::Focus => Some(PseudoClass::Focus),
            StaticState::Active => Some(PseudoClass::Active),
            StaticState::Disabled => Some(PseudoClass::Disabled),
        }
    }

    fn prefix(self) -> Option<&'static str> {
        self.pseudo_class().map(PseudoClass::key)
    }
}

/// Precompiled `(state, property, value)` class table
#[derive(Debug, Default)]
pub struct StaticTable {
    classes: HashMap<StaticState, HashMap<&'static str, HashMap<&'static str, String>>>,
    rules: Vec<CompiledRule>,
}

impl StaticTable {
    /// Compile the whole domain with a precompiling compiler
    pub fn build(compiler: &VariantCompiler) -> Result<Self, StyleError> {
        let mut table = Self::default();

        for state in StaticState::ALL {
            for (property, values) in STATIC_DOMAIN {
                for value in *values {
                    let declaration = json!({ *property: *value });
                    let block = match state.prefix() {
                        Some(pseudo) => json!({ pseudo: declaration }),
                        None => declaration,
                    };
                    let spec = StyleSpec::from_value(json!({ BASE_KEY: block }))?;

                    let name = match state.prefix() {
                        Some(pseudo) => format!("{}-{}-{}", pseudo, hyphenate(property), value),
                        None => format!("{}-{}", hyphenate(property), value),
                    };
                    let sheet = compiler.compile(&name, &spec)?;

                    let Some(class_name) = sheet.mapping.class_name else {
                        continue;
                    };
                    table.rules.extend(sheet.rules);
                    table
                        .classes
                        .entry(state)
                        .or_default()
                        .entry(*property)
                        .or_default()
                        .insert(*value, class_name);
                }
            }
        }

        tracing::debug!("Precompiled {} static rules", table.rules.len());
        Ok(table)
    }

    /// Look up a precompiled class
    pub fn class_name(&self, state: StaticState, property: &str, value: &str) -> Option<&str> {
        self.classes
            .get(&state)?
            .get(property)?
            .get(value)
            .map(String::as_str)
    }

    /// Every rule, in injection order
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
