use std::collections::BTreeSet;
use std::ops::Range;

/// Selected row indices. Kept ordered so exports come out ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSelection {
    rows: BTreeSet<usize>,
}

impl RowSelection {
    pub fn toggle(&mut self, row: usize) {
        if !self.rows.remove(&row) {
            self.rows.insert(row);
        }
    }

    pub fn select_all(&mut self, len: usize) {
        self.rows.extend(0..len);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deselects `range` if every row in it is selected, else selects it all.
    pub fn toggle_range(&mut self, range: Range<usize>) {
        if range.clone().all(|i| self.rows.contains(&i)) {
            for i in range {
                self.rows.remove(&i);
            }
        } else {
            self.rows.extend(range);
        }
    }

    /// The selection in ascending order, or `0..len` when nothing is selected.
    pub fn selected_or_all(&self, len: usize) -> Vec<usize> {
        if self.rows.is_empty() {
            (0..len).collect()
        } else {
            self.rows.iter().copied().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_means_all_rows() {
        let selection = RowSelection::default();
        assert_eq!(selection.selected_or_all(3), vec![0, 1, 2]);
    }

    #[test]
    fn selection_is_sorted() {
        let mut selection = RowSelection::default();
        for i in [7, 2, 5] {
            selection.toggle(i);
        }
        selection.toggle(5);
        assert_eq!(selection.selected_or_all(10), vec![2, 7]);
    }

    #[test]
    fn toggle_range_flips_whole_page() {
        let mut selection = RowSelection::default();
        selection.toggle(1);
        selection.toggle_range(0..3);
        assert_eq!(selection.len(), 3);
        selection.toggle_range(0..3);
        assert!(selection.is_empty());
    }
}
