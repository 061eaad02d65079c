//! Injection Targets
//!
//! Where compiled rule text ends up. [`MemorySheet`] collects text for
//! headless rendering; [`PagedSheet`] mirrors a live page, spreading rules
//! over several style tags and refusing rules a strict CSSOM would refuse.

use std::collections::HashMap;

use crate::error::InjectError;

/// Opaque handle to one injected rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleHandle(pub u64);

/// Destination for compiled rules
pub trait InjectionTarget {
    /// Insert one rule belonging to stylesheet `id`
    fn inject(&mut self, id: &str, css: &str) -> Result<RuleHandle, InjectError>;

    /// Remove a previously injected rule
    fn remove(&mut self, handle: RuleHandle) -> Result<(), InjectError>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    handle: RuleHandle,
    id: String,
    css: String,
}

/// In-memory rule list for server and headless rendering
#[derive(Debug, Default)]
pub struct MemorySheet {
    entries: Vec<MemoryEntry>,
    next_handle: u64,
    removed: u64,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All live rules joined by newlines, in insertion order
    pub fn css_text(&self) -> String {
        self.rules().collect::<Vec<_>>().join("\n")
    }

    /// Live rules in insertion order
    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.css.as_str())
    }

    /// Number of live rules belonging to a stylesheet
    pub fn count_for(&self, id: &str) -> usize {
        self.entries.iter().filter(|entry| entry.id == id).count()
    }

    /// Total rules removed over the sheet's lifetime
    pub fn removed_count(&self) -> u64 {
        self.removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl InjectionTarget for MemorySheet {
    fn inject(&mut self, id: &str, css: &str) -> Result<RuleHandle, InjectError> {
        let handle = RuleHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(MemoryEntry {
            handle,
            id: id.to_string(),
            css: css.to_string(),
        });
        Ok(handle)
    }

    fn remove(&mut self, handle: RuleHandle) -> Result<(), InjectError> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.handle == handle)
            .ok_or(InjectError::Unknown(handle))?;
        self.entries.remove(position);
        self.removed += 1;
        Ok(())
    }
}

/// One `<style>` element worth of rules
#[derive(Debug)]
struct StyleTag {
    serial: u64,
    rules: Vec<(RuleHandle, String)>,
}

/// Live page stylesheet emulation.
///
/// Older engines cap the number of rules per stylesheet, so a new tag is
/// opened whenever the last one holds `ceiling` rules. Removing a rule
/// shifts the ones after it, as `deleteRule` does, and a tag left empty is
/// dropped. Each rule is parsed with lightningcss first and rejected if it
/// does not parse.
#[derive(Debug)]
pub struct PagedSheet {
    tags: Vec<StyleTag>,
    ceiling: usize,
    /// Rule handle to the serial of the tag holding it
    locations: HashMap<RuleHandle, u64>,
    next_handle: u64,
    next_tag: u64,
}

impl Default for PagedSheet {
    fn default() -> Self {
        Self::new(4000)
    }
}

impl PagedSheet {
    /// Create a sheet holding at most `ceiling` rules per tag
    pub fn new(ceiling: usize) -> Self {
        Self {
            tags: Vec::new(),
            ceiling: ceiling.max(1),
            locations: HashMap::new(),
            next_handle: 0,
            next_tag: 0,
        }
    }

    /// Number of style tags currently on the page
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Rule text of one tag, in page order
    pub fn tag_text(&self, tag: usize) -> Option<String> {
        self.tags.get(tag).map(|tag| {
            tag.rules
                .iter()
                .map(|(_, css)| css.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Live rules across all tags
    pub fn rule_count(&self) -> usize {
        self.tags.iter().map(|tag| tag.rules.len()).sum()
    }

    fn validate(css: &str) -> Result<(), String> {
        use lightningcss::stylesheet::{ParserOptions, StyleSheet};

        let sheet = StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;
        if sheet.rules.0.is_empty() {
            return Err("no rule found".to_string());
        }
        Ok(())
    }
}

impl InjectionTarget for PagedSheet {
    fn inject(&mut self, id: &str, css: &str) -> Result<RuleHandle, InjectError> {
        Self::validate(css).map_err(|reason| InjectError::Rejected {
            id: id.to_string(),
            reason,
        })?;

        let needs_tag = self
            .tags
            .last()
            .is_none_or(|tag| tag.rules.len() >= self.ceiling);
        if needs_tag {
            tracing::debug!("Opening style tag {}", self.next_tag);
            self.tags.push(StyleTag {
                serial: self.next_tag,
                rules: Vec::new(),
            });
            self.next_tag += 1;
        }

        let handle = RuleHandle(self.next_handle);
        self.next_handle += 1;

        let Some(tag) = self.tags.last_mut() else {
            return Err(InjectError::Rejected {
                id: id.to_string(),
                reason: "no style tag".to_string(),
            });
        };
        tag.rules.push((handle, css.to_string()));
        self.locations.insert(handle, tag.serial);
        Ok(handle)
    }

    fn remove(&mut self, handle: RuleHandle) -> Result<(), InjectError> {
        let serial = self
            .locations
            .remove(&handle)
            .ok_or(InjectError::Unknown(handle))?;
        let tag_index = self
            .tags
            .iter()
            .position(|tag| tag.serial == serial)
            .ok_or(InjectError::Unknown(handle))?;

        let tag = &mut self.tags[tag_index];
        tag.rules.retain(|(rule, _)| *rule != handle);
        if tag.rules.is_empty() {
            tracing::debug!("Dropping empty style tag {}", serial);
            self.tags.remove(tag_index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sheet_collects_text() {
        let mut sheet = MemorySheet::new();
        sheet.inject("a", ".a{color:red}").unwrap();
        let second = sheet.inject("b", ".b{color:blue}").unwrap();

        assert_eq!(sheet.css_text(), ".a{color:red}\n.b{color:blue}");
        assert_eq!(sheet.count_for("a"), 1);

        sheet.remove(second).unwrap();
        assert_eq!(sheet.css_text(), ".a{color:red}");
        assert_eq!(sheet.removed_count(), 1);
        assert!(matches!(sheet.remove(second), Err(InjectError::Unknown(_))));
    }

    #[test]
    fn test_paged_sheet_splits_at_ceiling() {
        let mut sheet = PagedSheet::new(2);
        for i in 0..5 {
            sheet.inject("s", &format!(".c{}{{color:red}}", i)).unwrap();
        }
        assert_eq!(sheet.tag_count(), 3);
        assert_eq!(sheet.rule_count(), 5);
        assert_eq!(sheet.tag_text(2).unwrap(), ".c4{color:red}");
    }

    #[test]
    fn test_paged_sheet_remove() {
        let mut sheet = PagedSheet::new(10);
        let first = sheet.inject("s", ".a{color:red}").unwrap();
        sheet.inject("s", ".b{color:red}").unwrap();

        sheet.remove(first).unwrap();
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(sheet.tag_text(0).unwrap(), ".b{color:red}");
        assert!(sheet.remove(first).is_err());
    }

    #[test]
    fn test_paged_sheet_churn_stays_bounded() {
        let mut sheet = PagedSheet::new(4);
        let keep = sheet.inject("s", ".keep{color:red}").unwrap();

        for round in 0..100 {
            let handles: Vec<_> = (0..3)
                .map(|i| sheet.inject("t", &format!(".r{}-{}{{color:red}}", round, i)).unwrap())
                .collect();
            assert!(sheet.tag_count() <= 1);
            for handle in handles {
                sheet.remove(handle).unwrap();
            }
        }

        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(sheet.tag_count(), 1);
        sheet.remove(keep).unwrap();
        assert_eq!(sheet.tag_count(), 0);
    }

    #[test]
    fn test_paged_sheet_drops_emptied_tags() {
        let mut sheet = PagedSheet::new(2);
        let first = sheet.inject("s", ".a{color:red}").unwrap();
        let second = sheet.inject("s", ".b{color:red}").unwrap();
        sheet.inject("s", ".c{color:red}").unwrap();
        assert_eq!(sheet.tag_count(), 2);

        sheet.remove(first).unwrap();
        sheet.remove(second).unwrap();
        assert_eq!(sheet.tag_count(), 1);
        assert_eq!(sheet.tag_text(0).unwrap(), ".c{color:red}");

        sheet.inject("s", ".d{color:red}").unwrap();
        assert_eq!(sheet.tag_count(), 1);
        assert_eq!(sheet.tag_text(0).unwrap(), ".c{color:red}\n.d{color:red}");
    }

    #[test]
    fn test_paged_sheet_rejects_invalid_rules() {
        let mut sheet = PagedSheet::new(10);
        let result = sheet.inject("s", ".a..b{color:red}");
        assert!(matches!(result, Err(InjectError::Rejected { .. })));
        assert_eq!(sheet.rule_count(), 0);
    }

    #[test]
    fn test_paged_sheet_accepts_compiled_selectors() {
        let mut sheet = PagedSheet::new(10);
        sheet
            .inject("s", ".Box-em-1a2b.RTL:hover{padding-right:12px !important}")
            .unwrap();
        assert_eq!(sheet.rule_count(), 1);
    }
}
