//! Compiler and Manager Configuration

use std::time::Duration;

use serde::Deserialize;

/// Compiler options
///
/// One compiler serves both call sites; the options pick the behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Append `!important` to every declaration
    pub important: bool,

    /// Emit mirrored rules for logical start/end properties
    pub support_rtl: bool,

    /// Keep the source block of every class for inspection
    pub collect_debug_repr: bool,

    /// Declarations prepended to the `base` rule, camelCase name first
    pub default_base: Vec<(String, String)>,
}

impl CompileOptions {
    /// Options for runtime-computed styles
    pub fn dynamic() -> Self {
        Self {
            important: false,
            support_rtl: true,
            collect_debug_repr: false,
            default_base: vec![("boxSizing".to_string(), "border-box".to_string())],
        }
    }

    /// Options for the precompiled static table
    pub fn precompiled() -> Self {
        Self {
            important: true,
            support_rtl: true,
            collect_debug_repr: false,
            default_base: Vec::new(),
        }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::dynamic()
    }
}

/// Stylesheet manager configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Options for dynamically compiled stylesheets
    pub compile: CompileOptions,

    /// Grace period before the rules of an unused stylesheet are removed
    pub debounce_ms: u64,

    /// Report injection failures through `tracing::warn!`
    pub dev_warnings: bool,

    /// Maximum number of compiled stylesheets kept in the cache
    pub max_cached: usize,

    /// Precompile and inject the static value table on construction
    pub precompile_static: bool,
}

impl ManagerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            compile: CompileOptions::dynamic(),
            debounce_ms: 16, // one frame
            dev_warnings: cfg!(debug_assertions),
            max_cached: 1024,
            precompile_static: true,
        }
    }
}
