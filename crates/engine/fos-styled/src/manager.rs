//! Stylesheet Manager
//!
//! Owns the compiled-stylesheet cache, the reference counts of injected
//! stylesheets and the precompiled static table.
//!
//! Rules are injected when the first user arrives. When the last user
//! leaves, removal is deferred by the debounce window and cancelled if the
//! stylesheet is used again in the meantime, so an unmount immediately
//! followed by a remount of the same style leaves the target untouched.
//!
//! Initialization order: the static table is compiled and injected in
//! [`StylesheetManager::new`], before any dynamic lookup can happen.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use crate::compiler::{CompiledRule, CompiledStylesheet, VariantCompiler};
use crate::config::{CompileOptions, ManagerConfig};
use crate::error::StyleError;
use crate::hash::NameHasher;
use crate::inject::{InjectionTarget, RuleHandle};
use crate::resolver::{self, ResolveOptions, VariantSelection};
use crate::spec::StyleSpec;
use crate::static_table::{StaticState, StaticTable};
use crate::timer::{Timer, TimerToken};

/// Display name used for runtime-computed inline styles
pub const DYNAMIC_NAME: &str = "dyn";

/// Injection id of the static table
pub const STATIC_SHEET_ID: &str = "static";

/// Proof of one active use of a stylesheet. Hand it back to
/// [`StylesheetManager::dispose`] when done.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a stylesheet stays injected until its handle is disposed"]
pub struct StyleHandle {
    id: Rc<str>,
    /// Injection the handle belongs to; a handle outliving its injection
    /// (through eviction or reset) no longer counts
    serial: u64,
}

impl StyleHandle {
    /// Id of the stylesheet this handle keeps alive
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A runtime style compiled, injected and in use
#[derive(Debug)]
pub struct DynamicStyle {
    pub class_name: String,
    pub handle: StyleHandle,
}

/// Manager counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerStats {
    pub compiles: u64,
    pub cache_hits: u64,
    pub injections: u64,
    pub evictions: u64,
    pub injection_failures: u64,
}

/// Injection state of one stylesheet
#[derive(Debug)]
struct LiveSheet {
    serial: u64,
    refs: usize,
    handles: Vec<RuleHandle>,
    /// Generation of the scheduled removal
    removal: Option<u64>,
    /// Timer armed for that removal
    token: Option<TimerToken>,
}

struct ManagerState<T> {
    config: ManagerConfig,
    compiler: VariantCompiler,
    target: T,
    cache: HashMap<u64, Rc<CompiledStylesheet>>,
    live: HashMap<Rc<str>, LiveSheet>,
    static_table: StaticTable,
    static_handles: Vec<RuleHandle>,
    stats: ManagerStats,
    generation: u64,
    next_serial: u64,
}

impl<T: InjectionTarget> ManagerState<T> {
    /// Inject rules, continuing past failures
    fn inject_rules(&mut self, id: &str, rules: &[CompiledRule]) -> Vec<RuleHandle> {
        let mut handles = Vec::with_capacity(rules.len());
        for rule in rules {
            match self.target.inject(id, &rule.css_text()) {
                Ok(handle) => {
                    handles.push(handle);
                    self.stats.injections += 1;
                }
                Err(e) => {
                    self.stats.injection_failures += 1;
                    if self.config.dev_warnings {
                        tracing::warn!("Failed to inject rule {}: {}", rule.selector, e);
                    }
                }
            }
        }
        handles
    }

    fn remove_rules(&mut self, handles: Vec<RuleHandle>) {
        for handle in handles {
            if let Err(e) = self.target.remove(handle) {
                tracing::debug!("Rule removal failed: {}", e);
            }
        }
    }

    fn inject_static(&mut self) -> Result<(), StyleError> {
        let table = StaticTable::build(&VariantCompiler::new(CompileOptions::precompiled()))?;
        let rules = table.rules().to_vec();
        self.static_handles = self.inject_rules(STATIC_SHEET_ID, &rules);
        self.static_table = table;
        Ok(())
    }

    /// Timer callback: remove a stylesheet nobody picked up again
    fn evict(&mut self, id: &str, generation: u64) {
        let still_unused = self.live.get(id).is_some_and(|sheet| {
            sheet.refs == 0 && sheet.removal == Some(generation)
        });
        if !still_unused {
            return;
        }

        if let Some(sheet) = self.live.remove(id) {
            tracing::debug!("Removing {} rules of stylesheet {}", sheet.handles.len(), id);
            self.remove_rules(sheet.handles);
            self.stats.evictions += 1;
        }
    }

    /// Drop cached stylesheets nobody else holds until under capacity
    fn trim_cache(&mut self) {
        if self.cache.len() < self.config.max_cached {
            return;
        }

        let target = self.config.max_cached / 2;
        let excess = self.cache.len() - target;
        let unused: Vec<u64> = self
            .cache
            .iter()
            .filter(|(_, sheet)| Rc::strong_count(sheet) == 1)
            .map(|(key, _)| *key)
            .take(excess)
            .collect();

        tracing::debug!("Trimming {} cached stylesheets", unused.len());
        for key in unused {
            self.cache.remove(&key);
        }
    }
}

/// Process-wide stylesheet cache and injector
pub struct StylesheetManager<T: InjectionTarget + 'static> {
    state: Rc<RefCell<ManagerState<T>>>,
    timer: Rc<dyn Timer>,
}

impl<T: InjectionTarget + 'static> StylesheetManager<T> {
    /// Create a manager. Precompiles and injects the static table when the
    /// configuration asks for it.
    pub fn new(config: ManagerConfig, target: T, timer: Rc<dyn Timer>) -> Result<Self, StyleError> {
        let compiler = VariantCompiler::new(config.compile.clone());
        let precompile = config.precompile_static;

        let mut state = ManagerState {
            config,
            compiler,
            target,
            cache: HashMap::new(),
            live: HashMap::new(),
            static_table: StaticTable::default(),
            static_handles: Vec::new(),
            stats: ManagerStats::default(),
            generation: 0,
            next_serial: 0,
        };
        if precompile {
            state.inject_static()?;
        }

        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            timer,
        })
    }

    /// Look a specification up by its canonical hash, compiling on a miss
    pub fn get_or_compile(&self, display_name: &str, spec: &StyleSpec) -> Result<Rc<CompiledStylesheet>, StyleError> {
        let mut hasher = NameHasher::new();
        hasher.write_str(display_name);
        hasher.write_str(&spec.canonical());
        let key = hasher.finish();

        let mut state = self.state.borrow_mut();
        if let Some(sheet) = state.cache.get(&key) {
            let sheet = Rc::clone(sheet);
            state.stats.cache_hits += 1;
            tracing::trace!("Stylesheet cache hit for {}", display_name);
            return Ok(sheet);
        }

        let sheet = Rc::new(state.compiler.compile(display_name, spec)?);
        state.stats.compiles += 1;
        state.trim_cache();
        state.cache.insert(key, Rc::clone(&sheet));
        Ok(sheet)
    }

    /// Start using a stylesheet, injecting its rules on the first use
    pub fn use_sheet(&self, sheet: &CompiledStylesheet) -> StyleHandle {
        let id: Rc<str> = Rc::from(sheet.id.as_str());
        let mut state = self.state.borrow_mut();

        if let Some(live) = state.live.get_mut(&id) {
            live.refs += 1;
            live.removal = None;
            let serial = live.serial;
            let token = live.token.take();
            drop(state);

            if let Some(token) = token {
                tracing::trace!("Stylesheet {} reused before removal", sheet.id);
                self.timer.cancel(token);
            }
            return StyleHandle { id, serial };
        }

        state.next_serial += 1;
        let serial = state.next_serial;
        tracing::debug!(
            "Injecting {} rules of stylesheet {}",
            sheet.rules.len(),
            sheet.id
        );
        let handles = state.inject_rules(&sheet.id, &sheet.rules);
        state.live.insert(
            Rc::clone(&id),
            LiveSheet {
                serial,
                refs: 1,
                handles,
                removal: None,
                token: None,
            },
        );
        StyleHandle { id, serial }
    }

    /// Release one use. The last release schedules removal after the
    /// debounce window. Handles from an earlier injection of the same
    /// stylesheet are ignored.
    pub fn dispose(&self, handle: StyleHandle) {
        let (generation, delay, stale) = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            let generation = state.generation;
            let delay = state.config.debounce();

            let Some(live) = state.live.get_mut(&handle.id) else {
                tracing::debug!("Dispose of unknown stylesheet {}", handle.id);
                return;
            };
            if live.serial != handle.serial {
                tracing::debug!("Ignoring stale handle for stylesheet {}", handle.id);
                return;
            }
            live.refs = live.refs.saturating_sub(1);
            if live.refs > 0 {
                return;
            }
            live.removal = Some(generation);
            (generation, delay, live.token.take())
        };

        if let Some(stale) = stale {
            self.timer.cancel(stale);
        }

        // Nothing is borrowed here, so the timer may fire right away
        let weak: Weak<RefCell<ManagerState<T>>> = Rc::downgrade(&self.state);
        let id = Rc::clone(&handle.id);
        let token = self.timer.arm(
            delay,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().evict(&id, generation);
                }
            }),
        );

        let mut state = self.state.borrow_mut();
        if let Some(live) = state.live.get_mut(&handle.id) {
            if live.removal == Some(generation) {
                live.token = Some(token);
            }
        }
    }

    /// Resolve a selection against a stylesheet's mapping
    pub fn resolve(&self, sheet: &CompiledStylesheet, selection: &VariantSelection, options: &ResolveOptions<'_>) -> Vec<String> {
        resolver::resolve(&sheet.mapping, selection, options)
    }

    /// Compile, cache and use a runtime-computed property block
    pub fn dynamic_style(&self, block: Map<String, Value>) -> Result<DynamicStyle, StyleError> {
        let spec = StyleSpec::from_base(block);
        let sheet = self.get_or_compile(DYNAMIC_NAME, &spec)?;
        let handle = self.use_sheet(&sheet);
        let class_name = sheet.class_name().unwrap_or_default().to_string();
        Ok(DynamicStyle { class_name, handle })
    }

    /// Precompiled class for a `(state, property, value)` triple
    pub fn static_class(&self, state: StaticState, property: &str, value: &str) -> Option<String> {
        self.state
            .borrow()
            .static_table
            .class_name(state, property, value)
            .map(str::to_string)
    }

    /// Current reference count of a stylesheet
    pub fn ref_count(&self, id: &str) -> usize {
        self.state
            .borrow()
            .live
            .get(id)
            .map_or(0, |sheet| sheet.refs)
    }

    /// Whether a stylesheet's rules are in the target
    pub fn is_injected(&self, id: &str) -> bool {
        self.state.borrow().live.contains_key(id)
    }

    /// Number of cached compiled stylesheets
    pub fn cached(&self) -> usize {
        self.state.borrow().cache.len()
    }

    pub fn stats(&self) -> ManagerStats {
        self.state.borrow().stats
    }

    /// Borrow the injection target
    pub fn target(&self) -> Ref<'_, T> {
        Ref::map(self.state.borrow(), |state| &state.target)
    }

    /// Remove every injected rule, forget all stylesheets and counters,
    /// then rebuild the static table if configured
    pub fn reset(&self) -> Result<(), StyleError> {
        let mut state = self.state.borrow_mut();

        let live: Vec<LiveSheet> = state.live.drain().map(|(_, sheet)| sheet).collect();
        for sheet in live {
            if let Some(token) = sheet.token {
                self.timer.cancel(token);
            }
            state.remove_rules(sheet.handles);
        }

        let static_handles = std::mem::take(&mut state.static_handles);
        state.remove_rules(static_handles);
        state.static_table = StaticTable::default();
        state.cache.clear();
        state.stats = ManagerStats::default();

        if state.config.precompile_static {
            state.inject_static()?;
        }
        tracing::debug!("Stylesheet manager reset");
        Ok(())
    }
}

impl<T: InjectionTarget + 'static> std::fmt::Debug for StylesheetManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("StylesheetManager")
            .field("cached", &state.cache.len())
            .field("live", &state.live.len())
            .field("stats", &state.stats)
            .finish()
    }
}
