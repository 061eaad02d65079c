//! Variant Compiler
//!
//! Compiles a [`StyleSpec`] into CSS class rules plus the mapping tree the
//! resolver walks at render time.
//!
//! Every variant key normalises to a sorted path (`hover_em` and `em_hover`
//! are the same path). Each path owns one class name of the form
//! `{name}-{path}-{id}`, or `{name}-{id}` for the root. The `id` hashes the
//! display name together with every compiled declaration, so changing any
//! rule changes every class name of the stylesheet.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::{self, hyphenate};
use crate::config::CompileOptions;
use crate::error::StyleError;
use crate::hash::NameHasher;
use crate::rtl::{self, Direction, RTL_CLASS};
use crate::spec::{PseudoClass, StyleSpec, VariantKey};

/// One emitted CSS rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledRule {
    /// Full selector, e.g. `.Button-em-1x2y3z.RTL:hover`
    pub selector: String,
    /// Declarations joined with `;`
    pub declarations: String,
}

impl CompiledRule {
    /// Rule text ready for injection
    pub fn css_text(&self) -> String {
        format!("{}{{{}}}", self.selector, self.declarations)
    }
}

/// Node of the class-name mapping tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassMapping {
    /// Class for the rules compiled at this path, if any were emitted
    #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Named sub-variants
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub then: BTreeMap<String, ClassMapping>,
}

impl ClassMapping {
    /// Follow a path of variant names
    pub fn get(&self, path: &[&str]) -> Option<&ClassMapping> {
        path.iter()
            .try_fold(self, |node, part| node.then.get(*part))
    }

    fn node_mut(&mut self, path: &[String]) -> &mut ClassMapping {
        let mut node = self;
        for part in path {
            node = node.then.entry(part.clone()).or_default();
        }
        node
    }
}

/// Result of compiling one specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledStylesheet {
    /// Content hash of the display name and every compiled rule
    pub id: String,
    pub display_name: String,
    /// Rules in injection order
    pub rules: Vec<CompiledRule>,
    pub mapping: ClassMapping,
    /// Class name to source block JSON, when debug collection is enabled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repr: Vec<(String, String)>,
}

impl CompiledStylesheet {
    /// Root class name
    pub fn class_name(&self) -> Option<&str> {
        self.mapping.class_name.as_deref()
    }

    /// All rules as one CSS string
    pub fn css_text(&self) -> String {
        self.rules
            .iter()
            .map(CompiledRule::css_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Declarations sharing a pseudo-class chain and direction
#[derive(Debug, Default)]
struct RuleSet {
    pseudo: Vec<PseudoClass>,
    direction: Direction,
    declarations: Vec<String>,
}

/// Compiled rule sets of one variant path, before class names exist
#[derive(Debug)]
struct PathRules {
    path: Vec<String>,
    sets: Vec<RuleSet>,
    sources: Vec<Value>,
}

impl PathRules {
    fn set_mut(&mut self, pseudo: &[PseudoClass], direction: Direction) -> &mut RuleSet {
        let position = self
            .sets
            .iter()
            .position(|set| set.pseudo == pseudo && set.direction == direction);
        let index = match position {
            Some(index) => index,
            None => {
                self.sets.push(RuleSet {
                    pseudo: pseudo.to_vec(),
                    direction,
                    declarations: Vec::new(),
                });
                self.sets.len() - 1
            }
        };
        &mut self.sets[index]
    }

    fn is_empty(&self) -> bool {
        self.sets.iter().all(|set| set.declarations.is_empty())
    }
}

/// Style specification compiler
#[derive(Debug, Clone, Default)]
pub struct VariantCompiler {
    options: CompileOptions,
}

impl VariantCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a specification under a display name
    pub fn compile(&self, display_name: &str, spec: &StyleSpec) -> Result<CompiledStylesheet, StyleError> {
        let display_name = css_ident(display_name);
        let mut paths = self.collect_paths(spec)?;

        // Root first, then shallower paths before deeper ones so compound
        // variants inject after (and override) their parts
        paths.sort_by(|a, b| {
            a.path
                .len()
                .cmp(&b.path.len())
                .then_with(|| a.path.cmp(&b.path))
        });

        let id = stylesheet_id(&display_name, &paths);

        let mut rules = Vec::new();
        let mut mapping = ClassMapping::default();
        let mut repr = Vec::new();

        for compiled in &paths {
            if compiled.is_empty() {
                continue;
            }

            let class_name = if compiled.path.is_empty() {
                format!("{}-{}", display_name, id)
            } else {
                let path: Vec<String> = compiled.path.iter().map(|p| path_segment(p)).collect();
                format!("{}-{}-{}", display_name, path.join("-"), id)
            };

            for set in &compiled.sets {
                if set.declarations.is_empty() {
                    continue;
                }
                rules.push(CompiledRule {
                    selector: selector(&class_name, set),
                    declarations: set.declarations.join(";"),
                });
            }

            if self.options.collect_debug_repr {
                let source = match compiled.sources.as_slice() {
                    [single] => single.to_string(),
                    many => Value::Array(many.to_vec()).to_string(),
                };
                repr.push((class_name.clone(), source));
            }

            mapping.node_mut(&compiled.path).class_name = Some(class_name);
        }

        tracing::debug!(
            "Compiled stylesheet {} ({}): {} rules",
            display_name,
            id,
            rules.len()
        );

        Ok(CompiledStylesheet {
            id,
            display_name,
            rules,
            mapping,
            repr,
        })
    }

    /// Group the specification's blocks by normalised path and compile
    /// their declarations. The root path always exists so the default base
    /// declarations apply even without a `base` key.
    fn collect_paths(&self, spec: &StyleSpec) -> Result<Vec<PathRules>, StyleError> {
        let mut root = PathRules {
            path: Vec::new(),
            sets: Vec::new(),
            sources: Vec::new(),
        };
        let base = root.set_mut(&[], Direction::Ltr);
        for (property, value) in &self.options.default_base {
            base.declarations
                .push(declaration(property, value, self.options.important));
        }

        let mut paths = vec![root];
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        index.insert(Vec::new(), 0);
        let mut seen: HashSet<Vec<String>> = HashSet::new();

        for (key, block) in spec.sorted() {
            let Some(variant) = VariantKey::parse(key)? else {
                tracing::trace!("Skipping variant key {:?} with no named part", key);
                continue;
            };

            let Value::Object(block) = block else {
                tracing::trace!("Skipping variant {} with non-object block", key);
                continue;
            };

            if !seen.insert(variant.path.clone()) {
                tracing::warn!(
                    "Variant {} repeats an existing combination, merging blocks",
                    key
                );
            }

            let slot = match index.get(&variant.path) {
                Some(&slot) => slot,
                None => {
                    index.insert(variant.path.clone(), paths.len());
                    paths.push(PathRules {
                        path: variant.path.clone(),
                        sets: Vec::new(),
                        sources: Vec::new(),
                    });
                    paths.len() - 1
                }
            };

            let rules = &mut paths[slot];
            if self.options.collect_debug_repr {
                rules.sources.push(Value::Object(block.clone()));
            }
            self.compile_block(block, &[], rules);
        }

        Ok(paths)
    }

    /// Compile one property block at a pseudo-class chain. Direct
    /// properties come first, then nested pseudo-class blocks.
    fn compile_block(&self, block: &Map<String, Value>, pseudo: &[PseudoClass], rules: &mut PathRules) {
        let important = self.options.important;
        let mut nested = Vec::new();

        // Make sure the LTR set precedes its RTL twin
        rules.set_mut(pseudo, Direction::Ltr);

        for (property, value) in block {
            if let Some(pseudo_class) = PseudoClass::from_key(property) {
                match value {
                    Value::Object(inner) => nested.push((pseudo_class, inner)),
                    _ => tracing::trace!("Ignoring non-block value under :{}", pseudo_class.css_name()),
                }
                continue;
            }

            match rtl::mirror(property) {
                Some(pair) if self.options.support_rtl => {
                    for direction in [Direction::Ltr, Direction::Rtl] {
                        let set = rules.set_mut(pseudo, direction);
                        for longhand in codec::expand_shorthand(pair.for_direction(direction), value) {
                            set.declarations
                                .push(declaration(&longhand.property, &longhand.value, important));
                        }
                    }
                }
                Some(pair) => {
                    let set = rules.set_mut(pseudo, Direction::Ltr);
                    for longhand in codec::expand_shorthand(pair.ltr, value) {
                        set.declarations
                            .push(declaration(&longhand.property, &longhand.value, important));
                    }
                }
                None => {
                    let set = rules.set_mut(pseudo, Direction::Ltr);
                    for longhand in codec::expand_shorthand(property, value) {
                        set.declarations
                            .push(declaration(&longhand.property, &longhand.value, important));
                    }
                }
            }
        }

        for (pseudo_class, inner) in nested {
            let mut chain = pseudo.to_vec();
            chain.push(pseudo_class);
            self.compile_block(inner, &chain, rules);
        }
    }
}

/// Compile with the dynamic options
pub fn compile(display_name: &str, spec: &StyleSpec) -> Result<CompiledStylesheet, StyleError> {
    VariantCompiler::new(CompileOptions::dynamic()).compile(display_name, spec)
}

fn declaration(property: &str, value: &str, important: bool) -> String {
    if important {
        format!("{}:{} !important", hyphenate(property), value)
    } else {
        format!("{}:{}", hyphenate(property), value)
    }
}

fn selector(class_name: &str, set: &RuleSet) -> String {
    let mut selector = format!(".{}", class_name);
    if set.direction.is_rtl() {
        selector.push('.');
        selector.push_str(RTL_CLASS);
    }
    for pseudo in &set.pseudo {
        selector.push(':');
        selector.push_str(pseudo.css_name());
    }
    selector
}

fn stylesheet_id(display_name: &str, paths: &[PathRules]) -> String {
    let mut hasher = NameHasher::new();
    hasher.write_str(display_name);

    for compiled in paths {
        hasher.write_u64(compiled.path.len() as u64);
        for part in &compiled.path {
            hasher.write_str(part);
        }
        for set in &compiled.sets {
            if set.declarations.is_empty() {
                continue;
            }
            for pseudo in &set.pseudo {
                hasher.write_str(pseudo.key());
            }
            hasher.write_str(if set.direction.is_rtl() { "rtl" } else { "ltr" });
            for declaration in &set.declarations {
                hasher.write_str(declaration);
            }
        }
    }

    hasher.finish_short()
}

/// Escape one variant name for a class name. ASCII alphanumerics pass
/// through and every other character becomes `_{hex}_`, so segments never
/// contain the `-` that joins them and distinct paths keep distinct classes.
fn path_segment(part: &str) -> String {
    let mut segment = String::with_capacity(part.len());
    for c in part.chars() {
        if c.is_ascii_alphanumeric() {
            segment.push(c);
        } else {
            segment.push_str(&format!("_{:x}_", c as u32));
        }
    }
    segment
}

/// Replace characters that cannot appear in a class name
fn css_ident(name: &str) -> String {
    let ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() {
        "css".to_string()
    } else {
        ident
    }
}
