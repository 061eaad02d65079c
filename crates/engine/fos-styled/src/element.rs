//! Styled Element
//!
//! Style lifecycle attached to any renderable node by composition. The host
//! framework calls [`StyledElement::on_mount`] and
//! [`StyledElement::on_unmount`] from its own lifecycle callbacks.

use std::rc::Rc;

use crate::compiler::CompiledStylesheet;
use crate::inject::InjectionTarget;
use crate::manager::{StyleHandle, StylesheetManager};
use crate::resolver::{self, ResolveOptions, VariantSelection};

/// Stylesheet capability of one rendered node
#[derive(Debug)]
pub struct StyledElement {
    sheet: Rc<CompiledStylesheet>,
    handle: Option<StyleHandle>,
}

impl StyledElement {
    pub fn new(sheet: Rc<CompiledStylesheet>) -> Self {
        Self { sheet, handle: None }
    }

    pub fn sheet(&self) -> &CompiledStylesheet {
        &self.sheet
    }

    pub fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    /// Start using the stylesheet. Mounting twice is a no-op.
    pub fn on_mount<T: InjectionTarget + 'static>(&mut self, manager: &StylesheetManager<T>) {
        if self.handle.is_none() {
            self.handle = Some(manager.use_sheet(&self.sheet));
        }
    }

    /// Release the stylesheet
    pub fn on_unmount<T: InjectionTarget + 'static>(&mut self, manager: &StylesheetManager<T>) {
        if let Some(handle) = self.handle.take() {
            manager.dispose(handle);
        }
    }

    /// Swap in a new stylesheet, keeping the element mounted if it was
    pub fn replace_sheet<T: InjectionTarget + 'static>(
        &mut self,
        manager: &StylesheetManager<T>,
        sheet: Rc<CompiledStylesheet>,
    ) {
        if sheet.id == self.sheet.id {
            return;
        }

        let was_mounted = self.is_mounted();
        // Use the new sheet before releasing the old one
        let handle = was_mounted.then(|| manager.use_sheet(&sheet));
        self.on_unmount(manager);
        self.sheet = sheet;
        self.handle = handle;
    }

    /// Class attribute for a selection; the first lookup mounts the sheet
    pub fn class_name<T: InjectionTarget + 'static>(
        &mut self,
        manager: &StylesheetManager<T>,
        selection: &VariantSelection,
        options: &ResolveOptions<'_>,
    ) -> String {
        self.on_mount(manager);
        resolver::class_string(&self.sheet.mapping, selection, options)
    }
}
