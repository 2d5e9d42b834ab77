//! Partial-edit coordinates and the seam through which section edits are issued.

use crate::error::{QuipError, Result};
use async_trait::async_trait;
use std::fmt;

/// Where an edit lands relative to its anchor.
///
/// The discriminant is the value sent in the `location` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditLocation {
    /// End of the document
    Append = 0,
    /// Start of the document
    Prepend = 1,
    /// After the anchored section
    AfterSection = 2,
    /// Before the anchored section
    BeforeSection = 3,
    /// In place of the anchored section
    ReplaceSection = 4,
    /// Remove the anchored section
    DeleteSection = 5,
    /// After the anchored document range
    AfterDocumentRange = 6,
    /// Before the anchored document range
    BeforeDocumentRange = 7,
    /// In place of the anchored document range
    ReplaceDocumentRange = 8,
    /// Remove the anchored document range
    DeleteDocumentRange = 9,
}

impl EditLocation {
    /// Wire value of the `location` field.
    #[inline]
    pub fn wire_value(self) -> u8 {
        self as u8
    }

    /// Anchored by a section id (`section_id` field).
    pub fn is_section(self) -> bool {
        matches!(
            self,
            EditLocation::AfterSection
                | EditLocation::BeforeSection
                | EditLocation::ReplaceSection
                | EditLocation::DeleteSection
        )
    }

    /// Anchored by a heading text range (`document_range` field).
    pub fn is_document_range(self) -> bool {
        matches!(
            self,
            EditLocation::AfterDocumentRange
                | EditLocation::BeforeDocumentRange
                | EditLocation::ReplaceDocumentRange
                | EditLocation::DeleteDocumentRange
        )
    }

    /// Whether the edit removes content, so no content is sent.
    pub fn is_delete(self) -> bool {
        matches!(
            self,
            EditLocation::DeleteSection | EditLocation::DeleteDocumentRange
        )
    }
}

/// Content format of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditFormat {
    /// HTML fragment
    #[default]
    Html,
    /// Markdown text
    Markdown,
}

impl EditFormat {
    /// Value of the `format` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            EditFormat::Html => "html",
            EditFormat::Markdown => "markdown",
        }
    }
}

impl fmt::Display for EditFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One partial edit of a document.
///
/// # Examples
///
/// ```
/// use quip_client::section::{DocumentEdit, EditLocation};
///
/// let edit = DocumentEdit::new(EditLocation::ReplaceSection)
///     .with_anchor("temp:C:abc")
///     .with_content("<p>hi</p>");
/// assert!(edit.validate().is_ok());
///
/// let missing_anchor = DocumentEdit::new(EditLocation::DeleteSection);
/// assert!(missing_anchor.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEdit {
    /// Where the content lands
    pub location: EditLocation,
    /// Format of `content`
    pub format: EditFormat,
    /// Section id or document range, depending on `location`
    pub anchor: Option<String>,
    /// New content; absent for deletions
    pub content: Option<String>,
}

impl DocumentEdit {
    /// An HTML edit at `location` with no anchor or content yet.
    pub fn new(location: EditLocation) -> Self {
        DocumentEdit {
            location,
            format: EditFormat::Html,
            anchor: None,
            content: None,
        }
    }

    /// Set the section id or document range.
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the content format.
    #[must_use]
    pub fn with_format(mut self, format: EditFormat) -> Self {
        self.format = format;
        self
    }

    /// Refuse edits the server could only reject.
    pub fn validate(&self) -> Result<()> {
        let anchored = self.location.is_section() || self.location.is_document_range();
        if anchored && self.anchor.as_deref().map_or(true, str::is_empty) {
            return Err(QuipError::InvalidEdit(format!(
                "{:?} requires an anchor",
                self.location
            )));
        }
        if !self.location.is_delete() && self.content.is_none() {
            return Err(QuipError::InvalidEdit(format!(
                "{:?} requires content",
                self.location
            )));
        }
        Ok(())
    }
}

/// Applies section edits to a live document.
///
/// Returns the document's refreshed HTML snapshot on success and `None` when the server
/// rejected the edit. Implemented by [`Document`](crate::client::Document); tests substitute
/// an in-memory editor.
#[async_trait]
pub trait SectionEditor: Send {
    /// Apply `content` at `location` relative to the section `section_id`.
    async fn edit_section(
        &mut self,
        location: EditLocation,
        section_id: &str,
        content: Option<&str>,
    ) -> Result<Option<String>>;
}
