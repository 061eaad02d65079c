//! End-to-end compiler and resolver tests for fos-styled
//!
//! Specification in, rules and class lists out.

use fos_styled::{
    compile, resolve, CompileOptions, ResolveOptions, StyleError, StyleSpec, VariantCompiler,
    VariantSelection,
};
use serde_json::json;

fn spec(value: serde_json::Value) -> StyleSpec {
    StyleSpec::from_value(value).unwrap()
}

fn bare() -> VariantCompiler {
    VariantCompiler::new(CompileOptions {
        default_base: Vec::new(),
        ..CompileOptions::dynamic()
    })
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn test_compile_is_deterministic() {
    let input = spec(json!({
        "base": {"color": "red", "hover": {"color": "blue"}},
        "em_strong": {"fontWeight": 700},
        "em": {"paddingStart": 4}
    }));

    let a = compile("Text", &input).unwrap();
    let b = compile("Text", &input).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_top_level_order_does_not_matter() {
    let a = compile(
        "Text",
        &StyleSpec::parse(r#"{"base": {"color": "red"}, "em": {"color": "green"}}"#).unwrap(),
    )
    .unwrap();
    let b = compile(
        "Text",
        &StyleSpec::parse(r#"{"em": {"color": "green"}, "base": {"color": "red"}}"#).unwrap(),
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_compound_key_order_invariance() {
    let a = bare().compile("B", &spec(json!({"em_hover": {"color": "red"}}))).unwrap();
    let b = bare().compile("B", &spec(json!({"hover_em": {"color": "red"}}))).unwrap();

    assert_eq!(a.rules, b.rules);
    assert_eq!(a.mapping, b.mapping);
    assert!(a.mapping.get(&["em", "hover"]).is_some());
}

// ============================================================================
// VALUES
// ============================================================================

#[test]
fn test_empty_values_never_reach_css() {
    let sheet = compile(
        "B",
        &spec(json!({
            "base": {"color": null, "background": false, "border": "", "margin": [null, false]},
            "em": {"color": null}
        })),
    )
    .unwrap();

    let css = sheet.css_text();
    assert_eq!(css, format!(".B-{}{{box-sizing:border-box}}", sheet.id));
    assert!(!css.contains("color:"));
    assert!(!css.contains("background:"));
    assert!(!css.contains("border:"));
    assert!(!css.contains("margin"));
    // A block with nothing left emits no rule and no class
    assert!(sheet.mapping.then.get("em").is_none());
}

#[test]
fn test_unitless_passthrough() {
    let sheet = bare().compile("B", &spec(json!({"base": {"flex": 1}}))).unwrap();
    assert_eq!(sheet.rules[0].declarations, "flex:1");

    let sheet = bare().compile("B", &spec(json!({"base": {"width": 1}}))).unwrap();
    assert_eq!(sheet.rules[0].declarations, "width:1px");
}

#[test]
fn test_box_shadow_expansion() {
    let sheet = bare()
        .compile("B", &spec(json!({"base": {"boxShadow": {"x": 10, "y": 10, "blur": 2, "inset": true}}})))
        .unwrap();
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(
        sheet.rules[0].declarations,
        "box-shadow:inset 10px 10px 2px 0px #000"
    );
}

#[test]
fn test_shorthand_objects_expand_to_longhands() {
    let sheet = bare()
        .compile(
            "B",
            &spec(json!({"base": {
                "padding": {"vertical": 2, "horizontal": 4},
                "borderBottom": {"width": 1, "style": "solid", "color": "#ccc"},
                "paddingH": 8
            }})),
        )
        .unwrap();
    assert_eq!(
        sheet.rules[0].declarations,
        "padding-top:2px;padding-right:4px;padding-bottom:2px;padding-left:4px;\
         border-bottom-width:1px;border-bottom-style:solid;border-bottom-color:#ccc;\
         padding-left:8px;padding-right:8px"
    );
}

#[test]
fn test_arrays_repeat_declarations() {
    let sheet = bare()
        .compile("B", &spec(json!({"base": {"display": ["-webkit-flex", "flex"]}})))
        .unwrap();
    assert_eq!(sheet.rules[0].declarations, "display:-webkit-flex;display:flex");
}

#[test]
fn test_malformed_values_are_tolerated() {
    let sheet = bare()
        .compile("B", &spec(json!({"base": {"notAProperty": {"a": 1}, "color": true}})))
        .unwrap();
    assert_eq!(
        sheet.rules[0].declarations,
        "not-a-property:{\"a\":1};color:true"
    );
}

// ============================================================================
// RTL
// ============================================================================

#[test]
fn test_rtl_pairing() {
    let sheet = bare().compile("B", &spec(json!({"base": {"paddingStart": 12}}))).unwrap();

    assert_eq!(sheet.rules.len(), 2);
    let ltr = &sheet.rules[0];
    let rtl = &sheet.rules[1];
    assert_eq!(ltr.declarations, "padding-left:12px");
    assert_eq!(rtl.declarations, "padding-right:12px");
    assert_eq!(rtl.selector.replace(".RTL", ""), ltr.selector);
}

#[test]
fn test_border_start_mirrors_structured_value() {
    let sheet = bare()
        .compile("B", &spec(json!({"base": {"borderStart": {"width": 2}}})))
        .unwrap();
    assert_eq!(sheet.rules[0].declarations, "border-left-width:2px");
    assert_eq!(sheet.rules[1].declarations, "border-right-width:2px");
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_base_compound_halts_compilation() {
    let result = compile("B", &spec(json!({"base": {"color": "red"}, "base_em": {}})));
    assert!(matches!(result, Err(StyleError::BaseInCompound { .. })));
}

#[test]
fn test_non_object_variant_is_skipped() {
    let sheet = bare()
        .compile("B", &spec(json!({"base": {"color": "red"}, "em": 3})))
        .unwrap();
    assert_eq!(sheet.rules.len(), 1);
    assert!(sheet.mapping.then.is_empty());
}

#[test]
fn test_keys_without_names_are_skipped() {
    let sheet = bare()
        .compile(
            "N",
            &spec(json!({"": {"color": "red"}, "_": {"color": "blue"}, "base": {"width": 1}})),
        )
        .unwrap();
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(sheet.rules[0].declarations, "width:1px");
    assert!(sheet.mapping.then.is_empty());
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_end_to_end_resolution() {
    let sheet = bare()
        .compile("Name", &spec(json!({"base": {"color": "red"}, "em": {"color": "green"}})))
        .unwrap();
    let id = &sheet.id;
    let none = ResolveOptions::default();

    assert_eq!(
        resolve(&sheet.mapping, &VariantSelection::new(), &none),
        vec![format!("Name-{}", id)]
    );
    assert_eq!(
        resolve(&sheet.mapping, &VariantSelection::new().with("em", false), &none),
        vec![format!("Name-{}", id)]
    );
    assert_eq!(
        resolve(&sheet.mapping, &VariantSelection::new().with("em", true), &none),
        vec![format!("Name-{}", id), format!("Name-em-{}", id)]
    );
}

#[test]
fn test_compound_resolution() {
    let sheet = bare()
        .compile(
            "N",
            &spec(json!({"base": {"color": "red"}, "em": {"color": "green"}, "em_strong": {"color": "blue"}})),
        )
        .unwrap();
    let id = &sheet.id;

    let selection = VariantSelection::new().with("em", true).with("strong", true);
    let classes = resolve(&sheet.mapping, &selection, &ResolveOptions::rtl().with_class("x"));
    assert_eq!(
        classes,
        vec![
            format!("N-{}", id),
            format!("N-em-{}", id),
            format!("N-em-strong-{}", id),
            "RTL".to_string(),
            "x".to_string(),
        ]
    );

    // The compound needs both flags
    let selection = VariantSelection::new().with("strong", true);
    assert_eq!(
        resolve(&sheet.mapping, &selection, &ResolveOptions::default()),
        vec![format!("N-{}", id)]
    );
}

#[test]
fn test_hyphenated_variant_does_not_pick_up_compound_rules() {
    let sheet = bare()
        .compile("N", &spec(json!({"a-b": {"color": "red"}, "a_b": {"color": "blue"}})))
        .unwrap();

    let classes = resolve(
        &sheet.mapping,
        &VariantSelection::new().with("a-b", true),
        &ResolveOptions::default(),
    );
    assert_eq!(classes.len(), 1);

    let matching: Vec<_> = sheet
        .rules
        .iter()
        .filter(|rule| rule.selector == format!(".{}", classes[0]))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].declarations, "color:red");
}
