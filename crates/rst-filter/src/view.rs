//! Applying filters to item sets.

use crate::ast::Filter;
use crate::error::Result;
use crate::item::Filterable;
use crate::parse::parse;

/// Parse `text` and return the matching items in input order.
///
/// # Errors
///
/// Returns the parse error unchanged; callers that must keep the previous
/// selection on a typo should use [`FilterView`].
pub fn apply_filter<'a, T: Filterable>(text: &str, items: &'a [T]) -> Result<Vec<&'a T>> {
    let filter = parse(text)?;
    Ok(items.iter().filter(|item| filter.evaluate(*item)).collect())
}

/// The filtered subset currently on screen.
///
/// Holds the raw text the user typed, the last filter that parsed, and the
/// positions (into the owning item list) of the items that matched it. A
/// syntax error updates the text but leaves the filter and the displayed
/// positions untouched.
#[derive(Debug, Clone, Default)]
pub struct FilterView {
    text: String,
    active: Filter,
    displayed: Vec<usize>,
}

impl FilterView {
    /// View with a blank filter and nothing displayed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw filter text, possibly invalid.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Positions of the displayed items.
    pub fn displayed(&self) -> &[usize] {
        &self.displayed
    }

    /// Displayed items resolved against `items`.
    pub fn select<'a, T>(&'a self, items: &'a [T]) -> impl Iterator<Item = &'a T> + 'a {
        self.displayed.iter().filter_map(|&index| items.get(index))
    }

    /// Replace the filter text and recompute against `items`.
    ///
    /// # Errors
    ///
    /// On a syntax error the text is still stored, but the displayed set and
    /// the active filter are kept as they were.
    pub fn set_text<T: Filterable>(&mut self, text: impl Into<String>, items: &[T]) -> Result<()> {
        self.text = text.into();
        let filter = parse(&self.text)?;
        self.active = filter;
        self.refresh(items);
        Ok(())
    }

    /// Re-apply the active filter to a new item list.
    pub fn refresh<T: Filterable>(&mut self, items: &[T]) {
        self.displayed = items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.active.evaluate(*item))
            .map(|(index, _)| index)
            .collect();
        tracing::trace!(
            total = items.len(),
            shown = self.displayed.len(),
            "filter view refreshed"
        );
    }

    /// Drop the displayed set (e.g. the result was cleared).
    pub fn clear(&mut self) {
        self.displayed.clear();
    }
}
