//! fOS Styled
//!
//! Compiles style objects (property maps with pseudo-class nesting and
//! named variants) into CSS class rules, injects them once per unique
//! style, and resolves runtime variant selections into class lists.
//!
//! # Example
//! ```rust,ignore
//! use fos_styled::{StyleSpec, VariantSelection, ResolveOptions};
//!
//! let spec = StyleSpec::parse(r#"{"base": {"color": "red"}, "em": {"color": "green"}}"#)?;
//! let sheet = fos_styled::compile("Text", &spec)?;
//! let classes = fos_styled::resolve(
//!     &sheet.mapping,
//!     &VariantSelection::new().with("em", true),
//!     &ResolveOptions::default(),
//! );
//! ```

mod error;
pub mod codec;
pub mod compiler;
pub mod config;
pub mod element;
pub mod hash;
pub mod inject;
pub mod manager;
pub mod resolver;
pub mod rtl;
pub mod spec;
pub mod static_table;
pub mod timer;

pub use codec::{expand_shorthand, hyphenate, stringify_value, Longhand};
pub use compiler::{compile, ClassMapping, CompiledRule, CompiledStylesheet, VariantCompiler};
pub use config::{CompileOptions, ManagerConfig};
pub use element::StyledElement;
pub use error::{InjectError, StyleError};
pub use hash::NameHasher;
pub use inject::{InjectionTarget, MemorySheet, PagedSheet, RuleHandle};
pub use manager::{DynamicStyle, ManagerStats, StyleHandle, StylesheetManager};
pub use resolver::{class_string, resolve, ResolveOptions, VariantSelection};
pub use rtl::{Direction, RTL_CLASS};
pub use spec::{PseudoClass, StyleSpec, VariantKey, BASE_KEY, COMPOUND_SEPARATOR};
pub use static_table::{StaticState, StaticTable};
pub use timer::{SmolTimer, Timer, TimerToken, VirtualTimer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
