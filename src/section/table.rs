//! Table index over a document snapshot.
//!
//! A [`Table`] maps the server-assigned identifiers of one `<table>` (its rows and cells) to
//! their current text. It is read-only: mutations are sent through a [`SectionEditor`] and the
//! index is then rebuilt from the snapshot the editor returns. From the moment an edit is
//! issued until a rebuild succeeds the index is stale; stale reads return `None` and stale
//! mutations fail with [`QuipError::StaleIndex`].
//!
//! Header cells and body cells are filtered the same way: when any cell of a row carries an
//! `id`, cells without one are layout filler and are skipped. Markup without any ids (for
//! example the output of [`create_table_html`](super::create_table_html)) is kept as-is.

use super::editor::{EditLocation, SectionEditor};
use super::html::{escape, row_html, selector};
use crate::error::{QuipError, Result};
use scraper::{ElementRef, Html};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    id: Option<String>,
    header: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    id: Option<String>,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    id: Option<String>,
    cells: Vec<Cell>,
}

/// Index of one table in a document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    id: Option<String>,
    columns: Vec<Column>,
    rows: Vec<Row>,
    stale: bool,
}

fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_id(element: ElementRef<'_>) -> Option<String> {
    element.value().attr("id").map(str::to_owned)
}

/// Keep id-carrying elements when any carry one, else keep all.
fn significant<'a>(elements: Vec<ElementRef<'a>>) -> Vec<ElementRef<'a>> {
    if elements.iter().any(|e| e.value().attr("id").is_some()) {
        elements
            .into_iter()
            .filter(|e| e.value().attr("id").is_some())
            .collect()
    } else {
        elements
    }
}

/// Direct `tr` children of a table section, ignoring rows of nested tables.
fn section_rows<'a>(section: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
        .collect()
}

fn row_cells<'a>(row: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    let cells = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == tag)
        .collect();
    significant(cells)
}

fn direct_child<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

impl Table {
    fn from_element(table: ElementRef<'_>) -> Self {
        let header_cells: Vec<ElementRef<'_>> = direct_child(table, "thead")
            .map(|thead| {
                section_rows(thead)
                    .into_iter()
                    .flat_map(|tr| row_cells(tr, "th"))
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = table
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "tbody")
            .flat_map(section_rows)
            .map(|tr| Row {
                id: element_id(tr),
                cells: row_cells(tr, "td")
                    .into_iter()
                    .map(|td| Cell {
                        id: element_id(td),
                        text: element_text(td),
                    })
                    .collect(),
            })
            .collect();

        let columns = if header_cells.is_empty() {
            let width = rows.first().map_or(0, |r| r.cells.len());
            vec![
                Column {
                    id: None,
                    header: None
                };
                width
            ]
        } else {
            header_cells
                .into_iter()
                .map(|th| Column {
                    id: element_id(th),
                    header: Some(element_text(th)),
                })
                .collect()
        };

        Table {
            id: element_id(table),
            columns,
            rows,
            stale: false,
        }
    }

    /// Index every table of an HTML snapshot, in document order.
    pub fn parse_all(html: &str) -> Vec<Table> {
        let document = Html::parse_document(html);
        document
            .select(&selector("table"))
            .map(Table::from_element)
            .collect()
    }

    /// Index the table with the given id.
    pub fn find(html: &str, table_id: &str) -> Option<Table> {
        let document = Html::parse_document(html);
        let found = document
            .select(&selector("table"))
            .find(|t| t.value().attr("id") == Some(table_id))
            .map(Table::from_element);
        found
    }

    /// Section id of the `<table>` element.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True between issuing an edit and the next successful rebuild.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of columns, from the header row or else the first body row.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of body rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Text of a cell, `None` out of range or while stale.
    pub fn get_cell_value(&self, column: usize, row: usize) -> Option<&str> {
        self.cell(column, row).map(|c| c.text.as_str())
    }

    /// Header text of a column; `None` out of range, for anonymous columns, or while stale.
    pub fn get_column_header(&self, column: usize) -> Option<&str> {
        if self.stale {
            return None;
        }
        self.columns.get(column)?.header.as_deref()
    }

    /// Section id of a body row; `None` out of range or while stale.
    pub fn row_id(&self, row: usize) -> Option<&str> {
        if self.stale {
            return None;
        }
        self.rows.get(row)?.id.as_deref()
    }

    /// Section id of a cell; `None` out of range or while stale.
    pub fn cell_id(&self, column: usize, row: usize) -> Option<&str> {
        self.cell(column, row)?.id.as_deref()
    }

    fn cell(&self, column: usize, row: usize) -> Option<&Cell> {
        if self.stale || column >= self.columns.len() {
            return None;
        }
        self.rows.get(row)?.cells.get(column)
    }

    /// Rebuild from a fresh snapshot. Returns false, leaving the index stale, when this table
    /// cannot be found in it.
    pub fn refresh(&mut self, html: &str) -> bool {
        let rebuilt = self.id.as_deref().and_then(|id| Table::find(html, id));
        match rebuilt {
            Some(table) => {
                *self = table;
                true
            }
            None => {
                self.stale = true;
                false
            }
        }
    }

    fn ensure_fresh(&self) -> Result<()> {
        if self.stale {
            Err(QuipError::StaleIndex)
        } else {
            Ok(())
        }
    }

    fn row_anchor(&self, row: usize) -> Result<String> {
        let row = self
            .rows
            .get(row)
            .ok_or_else(|| QuipError::InvalidEdit(format!("row {} out of range", row)))?;
        row.id
            .clone()
            .ok_or_else(|| QuipError::InvalidEdit("row has no section id".into()))
    }

    async fn apply<E>(
        &mut self,
        editor: &mut E,
        location: EditLocation,
        anchor: &str,
        content: Option<&str>,
    ) -> Result<bool>
    where
        E: SectionEditor + ?Sized,
    {
        self.stale = true;
        match editor.edit_section(location, anchor, content).await? {
            Some(html) => Ok(self.refresh(&html)),
            None => {
                // Rejected by the server: nothing changed, the index still holds.
                self.stale = false;
                Ok(false)
            }
        }
    }

    /// Replace the text of one cell.
    ///
    /// Returns `Ok(true)` when the edit was applied and the index rebuilt, `Ok(false)` when the
    /// server rejected it or the table was missing from the returned snapshot.
    pub async fn update_cell_value<E>(
        &mut self,
        editor: &mut E,
        column: usize,
        row: usize,
        value: &str,
    ) -> Result<bool>
    where
        E: SectionEditor + ?Sized,
    {
        self.ensure_fresh()?;
        let cell = self.cell(column, row).ok_or_else(|| {
            QuipError::InvalidEdit(format!("cell ({}, {}) out of range", column, row))
        })?;
        let anchor = cell
            .id
            .clone()
            .ok_or_else(|| QuipError::InvalidEdit("cell has no section id".into()))?;
        let content = escape(value);
        self.apply(editor, EditLocation::ReplaceSection, &anchor, Some(&content))
            .await
    }

    /// Append a row after the last one. Short value lists are padded with empty cells.
    pub async fn add_row<E, S>(&mut self, editor: &mut E, values: &[S]) -> Result<bool>
    where
        E: SectionEditor + ?Sized,
        S: AsRef<str>,
    {
        self.ensure_fresh()?;
        if self.rows.is_empty() {
            return Err(QuipError::InvalidEdit("table has no row to anchor to".into()));
        }
        let anchor = self.row_anchor(self.rows.len() - 1)?;
        let fragment = self.row_fragment(values);
        self.apply(editor, EditLocation::AfterSection, &anchor, Some(&fragment))
            .await
    }

    /// Insert a row before row `index`.
    pub async fn add_row_at<E, S>(&mut self, editor: &mut E, index: usize, values: &[S]) -> Result<bool>
    where
        E: SectionEditor + ?Sized,
        S: AsRef<str>,
    {
        self.ensure_fresh()?;
        if self.rows.is_empty() {
            return Err(QuipError::InvalidEdit("table has no row to anchor to".into()));
        }
        let anchor = self.row_anchor(index)?;
        let fragment = self.row_fragment(values);
        self.apply(editor, EditLocation::BeforeSection, &anchor, Some(&fragment))
            .await
    }

    /// Delete row `index`. The last remaining row cannot be removed.
    pub async fn remove_row<E>(&mut self, editor: &mut E, index: usize) -> Result<bool>
    where
        E: SectionEditor + ?Sized,
    {
        self.ensure_fresh()?;
        if self.rows.len() <= 1 {
            return Err(QuipError::InvalidEdit(
                "cannot remove the only row of a table".into(),
            ));
        }
        let anchor = self.row_anchor(index)?;
        self.apply(editor, EditLocation::DeleteSection, &anchor, None)
            .await
    }

    fn row_fragment<S: AsRef<str>>(&self, values: &[S]) -> String {
        let mut cells: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        if cells.len() < self.columns.len() {
            cells.resize(self.columns.len(), "");
        }
        row_html(&cells)
    }
}
