//! Preview grid for the current page of a source.
//!
//! Cells go through `CellValue::preview`, which truncates and is therefore
//! only fit for display.

use crate::source::TabularSource;

/// Which columns the preview shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PreviewMode {
    /// Target attributes mapped to a source field.
    #[default]
    Matched,
    /// Every source field, as loaded.
    Raw,
}

impl PreviewMode {
    pub fn toggled(self) -> Self {
        match self {
            PreviewMode::Matched => PreviewMode::Raw,
            PreviewMode::Raw => PreviewMode::Matched,
        }
    }

    /// Label of the toggle button.
    pub fn label(self) -> &'static str {
        match self {
            PreviewMode::Matched => "Matched",
            PreviewMode::Raw => "Raw",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreviewRow {
    /// Index into the source rows.
    pub index: usize,
    pub selected: bool,
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreviewGrid {
    pub columns: Vec<String>,
    pub rows: Vec<PreviewRow>,
    /// `"start-end"` of the visible page.
    pub range_label: String,
    pub page_fully_selected: bool,
}

/// Builds the grid for the visible page.
///
/// Matched mode needs at least one mapped attribute; without one there is
/// nothing meaningful to show and `None` is returned.
pub fn build_preview(
    source: &TabularSource,
    target_attributes: &[String],
    mode: PreviewMode,
) -> Option<PreviewGrid> {
    let header = source.header();
    if header.is_empty() {
        return None;
    }
    let columns: Vec<(String, Option<String>)> = match mode {
        PreviewMode::Raw => header.iter().map(|h| (h.clone(), Some(h.clone()))).collect(),
        PreviewMode::Matched => {
            let included = source.mapping.included_attributes(target_attributes);
            if included.is_empty() {
                return None;
            }
            included
                .into_iter()
                .map(|attr| {
                    let field = source.mapping.get(&attr).field().map(str::to_string);
                    (attr, field)
                })
                .collect()
        }
    };

    let len = source.row_count();
    let range = source.pager.range(len);
    let page_fully_selected =
        !range.is_empty() && range.clone().all(|i| source.selection.is_selected(i));
    let rows = range
        .map(|index| PreviewRow {
            index,
            selected: source.selection.is_selected(index),
            cells: columns
                .iter()
                .map(|(_, field)| {
                    field
                        .as_deref()
                        .and_then(|f| source.row_value(index, f))
                        .map(|v| v.preview())
                        .unwrap_or_default()
                })
                .collect(),
        })
        .collect();

    Some(PreviewGrid {
        columns: columns.into_iter().map(|(name, _)| name).collect(),
        rows,
        range_label: source.pager.label(len),
        page_fully_selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingTarget;

    #[test]
    fn raw_mode_shows_every_field() {
        let source = TabularSource::load_file("a.csv", "x,y\n1,2\n3\n").unwrap();
        let grid = build_preview(&source, &[], PreviewMode::Raw).unwrap();
        assert_eq!(grid.columns, vec!["x", "y"]);
        assert_eq!(grid.rows[1].cells, vec!["3", ""]);
        assert_eq!(grid.range_label, "1-2");
    }

    #[test]
    fn matched_mode_resolves_through_mapping() {
        let mut source = TabularSource::load_file("a.json", r#"[{"A":"long"},{"B":2}]"#).unwrap();
        let attributes = vec!["a".to_string(), "b".to_string(), "id".to_string()];
        assert!(build_preview(&source, &attributes, PreviewMode::Matched).is_none());

        source.mapping.set("a", MappingTarget::Field("A".to_string()));
        source.mapping.set("b", MappingTarget::Field("B".to_string()));
        source.mapping.set("id", MappingTarget::Auto);
        source.toggle_row(1);
        let grid = build_preview(&source, &attributes, PreviewMode::Matched).unwrap();
        assert_eq!(grid.columns, vec!["a", "b"]);
        assert_eq!(grid.rows[0].cells, vec!["long", ""]);
        assert_eq!(grid.rows[1].cells, vec!["", "2"]);
        assert!(grid.rows[1].selected);
        assert!(!grid.page_fully_selected);
    }

    #[test]
    fn mode_toggles() {
        assert_eq!(PreviewMode::default().toggled(), PreviewMode::Raw);
        assert_eq!(PreviewMode::Raw.toggled().label(), "Matched");
    }
}
