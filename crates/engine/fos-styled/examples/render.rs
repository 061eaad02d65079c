//! Example: compile a style object, inject it and resolve class names

use std::rc::Rc;
use std::time::Duration;

use fos_styled::{
    ManagerConfig, MemorySheet, ResolveOptions, StaticState, StyleSpec, StyledElement,
    StylesheetManager, VariantSelection, VirtualTimer,
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let timer = Rc::new(VirtualTimer::new());
    let manager = StylesheetManager::new(ManagerConfig::default(), MemorySheet::new(), timer.clone())?;

    let spec = StyleSpec::parse(
        r##"{
            "base": {"color": "#222", "paddingStart": 8, "hover": {"color": "#000"}},
            "primary": {"backgroundColor": "royalblue", "color": "white"},
            "primary_disabled": {"opacity": 0.5}
        }"##,
    )?;
    let sheet = manager.get_or_compile("Button", &spec)?;

    let mut button = StyledElement::new(sheet);
    let selection = VariantSelection::new()
        .with("primary", true)
        .with("disabled", true);
    let class = button.class_name(&manager, &selection, &ResolveOptions::rtl());

    println!("fOS Styled v{}", fos_styled::VERSION);
    println!("class=\"{}\"", class);
    if let Some(pointer) = manager.static_class(StaticState::Hover, "cursor", "pointer") {
        println!("static hover pointer: {}", pointer);
    }
    println!("{}", manager.target().css_text());

    button.on_unmount(&manager);
    timer.advance(Duration::from_secs(1));
    println!("{:?}", manager);
    Ok(())
}
