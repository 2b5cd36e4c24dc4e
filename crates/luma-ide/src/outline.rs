//! Outline ("object explorer") entries derived from fold regions.

use text_size::TextSize;

use crate::FoldRegion;

const ANONYMOUS: &str = "<anonymous>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub name: String,
    /// Where the caret goes when the entry is activated.
    pub offset: TextSize,
}

impl OutlineEntry {
    /// Name shown to the user; anonymous functions get a placeholder.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { ANONYMOUS } else { &self.name }
    }
}

/// One entry per region, in the same order.
pub fn outline(regions: &[FoldRegion]) -> Vec<OutlineEntry> {
    regions
        .iter()
        .map(|region| OutlineEntry { name: region.name.clone(), offset: region.start() })
        .collect()
}

/// Caret position for the entry at `index`, if it exists.
pub fn caret_offset(entries: &[OutlineEntry], index: usize) -> Option<TextSize> {
    entries.get(index).map(|entry| entry.offset)
}
