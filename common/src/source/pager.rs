use std::ops::Range;

/// Rows shown per preview page.
pub const PAGE_SIZE: usize = 10;

/// Preview pagination cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    offset: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }
}

impl Pager {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Advances one page, never past the last row.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.offset = (self.offset + self.page_size).min(len.saturating_sub(1));
    }

    pub fn prev(&mut self) {
        self.offset = self.offset.saturating_sub(self.page_size);
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Row indices of the visible page.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        start..(self.offset + self.page_size).min(len)
    }

    /// `"start-end"`, 1-based, as shown above the preview table.
    pub fn label(&self, len: usize) -> String {
        let range = self.range(len);
        format!("{}-{}", self.offset + 1, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_clamps_to_last_row() {
        let mut pager = Pager::default();
        pager.next(15);
        assert_eq!(pager.offset(), 10);
        pager.next(15);
        assert_eq!(pager.offset(), 14);
        assert_eq!(pager.range(15), 14..15);
        assert_eq!(pager.label(15), "15-15");
    }

    #[test]
    fn empty_data_never_moves() {
        let mut pager = Pager::default();
        pager.next(0);
        pager.prev();
        assert_eq!(pager.offset(), 0);
        assert_eq!(pager.range(0), 0..0);
    }

    #[test]
    fn prev_saturates_at_zero() {
        let mut pager = Pager::with_page_size(10);
        pager.next(100);
        pager.prev();
        pager.prev();
        assert_eq!(pager.offset(), 0);
        assert_eq!(pager.label(100), "1-10");
    }
}
