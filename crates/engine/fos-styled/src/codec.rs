//! Property Codec
//!
//! Property-name hyphenation, value stringification and structured
//! shorthand expansion. Everything here works on camelCase property names;
//! hyphenation happens when a declaration is finally written out.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{Map, Number, Value};

/// Properties whose numeric values are written without a `px` suffix
pub const UNITLESS_PROPERTIES: &[&str] = &[
    "animationIterationCount",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "boxFlex",
    "boxFlexGroup",
    "boxOrdinalGroup",
    "columnCount",
    "columns",
    "flex",
    "flexGrow",
    "flexPositive",
    "flexShrink",
    "flexNegative",
    "flexOrder",
    "fontWeight",
    "gridArea",
    "gridColumn",
    "gridColumnEnd",
    "gridColumnSpan",
    "gridColumnStart",
    "gridRow",
    "gridRowEnd",
    "gridRowSpan",
    "gridRowStart",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
    // SVG
    "fillOpacity",
    "floodOpacity",
    "stopOpacity",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
];

/// A single expanded declaration, property still in camelCase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Longhand {
    pub property: String,
    pub value: String,
}

impl Longhand {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Shorthand families that accept a structured object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shorthand {
    /// padding / margin: `{top, right, bottom, left, vertical, horizontal}`
    Sides,
    /// border, borderLeft, ..., outline: `{width, style, color}`
    Border,
    /// `{attachment, color, image, position, repeat}`
    Background,
    BoxShadow,
    TextShadow,
    Transition,
}

impl Shorthand {
    fn of(property: &str) -> Option<Self> {
        match property {
            "padding" | "margin" => Some(Shorthand::Sides),
            "border" | "borderLeft" | "borderTop" | "borderRight" | "borderBottom" | "outline" => {
                Some(Shorthand::Border)
            }
            "background" => Some(Shorthand::Background),
            "boxShadow" => Some(Shorthand::BoxShadow),
            "textShadow" => Some(Shorthand::TextShadow),
            "transition" => Some(Shorthand::Transition),
            _ => None,
        }
    }

    /// Families whose list form is a comma separated single value
    fn is_layered(self) -> bool {
        matches!(
            self,
            Shorthand::BoxShadow | Shorthand::TextShadow | Shorthand::Transition
        )
    }
}

thread_local! {
    static HYPHENATED: RefCell<HashMap<String, Rc<str>>> = RefCell::new(HashMap::new());
}

/// Convert a camelCase property name to its CSS form.
///
/// `borderLeft` becomes `border-left`. A leading capital marks a vendor
/// prefix (`WebkitTransition` becomes `-webkit-transition`), as does a
/// leading `ms` (`msFlex` becomes `-ms-flex`). Results are memoized for the
/// lifetime of the thread.
pub fn hyphenate(name: &str) -> Rc<str> {
    HYPHENATED.with(|cache| {
        if let Some(hit) = cache.borrow().get(name) {
            return Rc::clone(hit);
        }

        let converted: Rc<str> = Rc::from(hyphenate_uncached(name));
        cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&converted));
        converted
    })
}

fn hyphenate_uncached(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);

    let is_ms_prefix = name.starts_with("ms")
        && name[2..].chars().next().is_some_and(|c| c.is_ascii_uppercase());
    if is_ms_prefix {
        out.push('-');
    }

    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Check the unitless property set
pub fn is_unitless(property: &str) -> bool {
    UNITLESS_PROPERTIES.contains(&property)
}

/// Values that mean "no declaration": null, false and the empty string
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !*b,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Stringify one value for `property`.
///
/// Numbers get a `px` suffix unless the property is unitless or the number
/// is zero. Strings pass through unchanged. Returns `None` for empty values.
/// Anything else is written out as its JSON text; no grammar validation
/// happens here.
pub fn stringify_value(property: &str, value: &Value) -> Option<String> {
    if is_empty_value(value) {
        return None;
    }

    let text = match value {
        Value::Number(n) => {
            let number = format_number(n);
            if number == "0" || is_unitless(property) {
                number
            } else {
                format!("{}px", number)
            }
        }
        Value::String(s) => s.clone(),
        Value::Bool(_) => "true".to_string(),
        other => other.to_string(),
    };
    Some(text)
}

/// Format a JSON number without a trailing `.0`
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => format!("{}", f),
        None => n.to_string(),
    }
}

/// Expand `property: value` into longhand declarations.
///
/// Arrays emit the property once per element, except for layered
/// properties (`boxShadow`, `textShadow`, `transition`) whose elements are
/// joined into one comma separated value. Structured objects on whitelisted
/// shorthands are expanded; scalars always produce a single declaration.
pub fn expand_shorthand(property: &str, value: &Value) -> Vec<Longhand> {
    let mut out = Vec::new();
    expand_into(property, value, &mut out);
    out
}

fn expand_into(property: &str, value: &Value, out: &mut Vec<Longhand>) {
    if is_empty_value(value) {
        return;
    }

    if let Some((first, second)) = axis_pair(property) {
        expand_into(&first, value, out);
        expand_into(&second, value, out);
        return;
    }

    let shorthand = Shorthand::of(property);

    match value {
        Value::Array(items) => match shorthand {
            Some(kind) if kind.is_layered() => {
                let layers: Vec<String> = items
                    .iter()
                    .filter(|item| !is_empty_value(item))
                    .filter_map(|item| layer_value(kind, property, item))
                    .collect();
                if !layers.is_empty() {
                    out.push(Longhand::new(property, layers.join(", ")));
                }
            }
            _ => {
                for item in items {
                    direct(property, item, out);
                }
            }
        },
        Value::Object(map) => match shorthand {
            Some(Shorthand::Sides) => expand_sides(property, map, out),
            Some(Shorthand::Border) => expand_suffixed(property, map, &BORDER_PARTS, out),
            Some(Shorthand::Background) => expand_suffixed(property, map, &BACKGROUND_PARTS, out),
            Some(kind) => {
                if let Some(composite) = layer_value(kind, property, value) {
                    out.push(Longhand::new(property, composite));
                }
            }
            None => direct(property, value, out),
        },
        _ => direct(property, value, out),
    }
}

fn direct(property: &str, value: &Value, out: &mut Vec<Longhand>) {
    if let Some(text) = stringify_value(property, value) {
        out.push(Longhand::new(property, text));
    }
}

/// `paddingH` and friends split into a pair of physical longhands
fn axis_pair(property: &str) -> Option<(String, String)> {
    let (base, horizontal) = match property {
        "paddingH" => ("padding", true),
        "paddingV" => ("padding", false),
        "marginH" => ("margin", true),
        "marginV" => ("margin", false),
        _ => return None,
    };
    let (a, b) = if horizontal {
        ("Left", "Right")
    } else {
        ("Top", "Bottom")
    };
    Some((format!("{}{}", base, a), format!("{}{}", base, b)))
}

fn expand_sides(property: &str, map: &Map<String, Value>, out: &mut Vec<Longhand>) {
    let vertical = map.get("vertical");
    let horizontal = map.get("horizontal");

    let sides = [
        ("Top", map.get("top").or(vertical)),
        ("Right", map.get("right").or(horizontal)),
        ("Bottom", map.get("bottom").or(vertical)),
        ("Left", map.get("left").or(horizontal)),
    ];

    for (suffix, value) in sides {
        if let Some(value) = value {
            direct(&format!("{}{}", property, suffix), value, out);
        }
    }
}

const BORDER_PARTS: [(&str, &str); 3] = [("width", "Width"), ("style", "Style"), ("color", "Color")];

const BACKGROUND_PARTS: [(&str, &str); 5] = [
    ("attachment", "Attachment"),
    ("color", "Color"),
    ("image", "Image"),
    ("position", "Position"),
    ("repeat", "Repeat"),
];

fn expand_suffixed(
    property: &str,
    map: &Map<String, Value>,
    parts: &[(&str, &str)],
    out: &mut Vec<Longhand>,
) {
    for (key, suffix) in parts {
        if let Some(value) = map.get(*key) {
            direct(&format!("{}{}", property, suffix), value, out);
        }
    }
}

/// Composite value for one layer of a layered shorthand. Strings are taken
/// verbatim.
fn layer_value(kind: Shorthand, property: &str, value: &Value) -> Option<String> {
    let map = match value {
        Value::Object(map) => map,
        other => return stringify_value(property, other),
    };

    let composite = match kind {
        Shorthand::BoxShadow => {
            let shadow = format!(
                "{} {} {} {} {}",
                with_unit(map.get("x"), "px"),
                with_unit(map.get("y"), "px"),
                with_unit(map.get("blur"), "px"),
                with_unit(map.get("spread"), "px"),
                text_or(map.get("color"), "#000"),
            );
            if map.get("inset").is_some_and(|v| !is_empty_value(v)) {
                format!("inset {}", shadow)
            } else {
                shadow
            }
        }
        Shorthand::TextShadow => format!(
            "{} {} {} {}",
            with_unit(map.get("x"), "px"),
            with_unit(map.get("y"), "px"),
            with_unit(map.get("blur"), "px"),
            text_or(map.get("color"), "#000"),
        ),
        Shorthand::Transition => {
            let transitioned = match map.get("property") {
                Some(Value::String(name)) if !name.is_empty() => hyphenate(name).to_string(),
                _ => "all".to_string(),
            };
            format!(
                "{} {} {} {}",
                transitioned,
                with_unit(map.get("duration"), "s"),
                text_or(map.get("timingFunction"), "ease"),
                with_unit(map.get("delay"), "s"),
            )
        }
        _ => return stringify_value(property, value),
    };
    Some(composite)
}

/// Numbers (or a missing value, read as 0) get `unit`; strings pass through
fn with_unit(value: Option<&Value>, unit: &str) -> String {
    match value {
        Some(Value::Number(n)) => format!("{}{}", format_number(n), unit),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => format!("0{}", unit),
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => format_number(n),
        _ => default.to_string(),
    }
}
