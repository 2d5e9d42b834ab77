//! Section-addressable document edits.
//!
//! Documents are edited in place by anchoring partial edits to server-assigned element
//! identifiers. This module extracts those identifiers from a document's HTML snapshot and
//! turns coordinate-based table operations into edits.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`Table`] | Index of one table: columns, rows, cell ids and text |
//! | [`SectionEditor`] | Seam that applies an edit and returns the new snapshot |
//! | [`DocumentEdit`], [`EditLocation`], [`EditFormat`] | One partial edit |
//! | [`create_table_html`], [`create_blank_table_html`] | Table markup builders |
//! | [`table_ids`] | Table identifiers of a snapshot |
//!
//! # Examples
//!
//! ```ignore
//! use quip_client::{Outcome, QuipClient};
//!
//! let Outcome::Value(mut doc) = client.open_document("AVN9AAeqq5w").await? else { return Ok(()) };
//! let table_id = doc.table_ids().remove(0);
//! let mut table = doc.table(&table_id).unwrap();
//! table.update_cell_value(&mut doc, 1, 0, "42").await?;
//! assert_eq!(table.get_cell_value(1, 0), Some("42"));
//! ```

mod editor;
mod html;
mod table;

pub use editor::{DocumentEdit, EditFormat, EditLocation, SectionEditor};
pub use html::{create_blank_table_html, create_table_html, escape, row_html, table_ids};
pub use table::Table;
