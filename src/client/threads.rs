//! Thread endpoints and the editable [`Document`] view.
//!
//! Every call is routed through [`QuipClient::execute`], so the retry loop, the rate-limit
//! tracker and the envelope handling apply uniformly.

use crate::client::fetch::QuipClient;
use crate::error::{QuipError, Result};
use crate::section::{table_ids, DocumentEdit, EditFormat, EditLocation, SectionEditor, Table};
use crate::types::{MultipartPart, Outcome, QuipRequest, Thread, ThreadType};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// Export formats served by `/threads/{id}/export/{format}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Word document
    Docx,
    /// Excel workbook
    Xlsx,
    /// PDF
    Pdf,
}

impl ExportFormat {
    /// Path segment of the export endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Parameters of `/threads/new-document`. Unset fields are left to server defaults.
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    /// Document title; derived from the content when unset
    pub title: Option<String>,
    /// Initial HTML or Markdown body
    pub content: Option<String>,
    /// Folders or users the document is shared with
    pub member_ids: Vec<String>,
    /// Format of `content`
    pub format: Option<EditFormat>,
    /// Document or spreadsheet
    pub thread_type: Option<ThreadType>,
}

impl QuipClient {
    /// Fetch one thread, including its HTML snapshot.
    pub async fn get_thread(&self, thread_id: &str) -> Result<Outcome<Thread>> {
        let url = self.config().endpoint(&format!("/threads/{}", thread_id));
        let outcome = self.fetch_object(QuipRequest::get(url)).await?;
        Ok(outcome.map(Thread::new))
    }

    /// Create a document or spreadsheet.
    pub async fn create_document(&self, params: &NewDocument) -> Result<Outcome<Thread>> {
        let mut request = QuipRequest::post(self.config().endpoint("/threads/new-document"))
            .with_form_opt("title", params.title.as_deref())
            .with_form_opt("content", params.content.as_deref());
        if !params.member_ids.is_empty() {
            request = request.with_form("member_ids", params.member_ids.join(","));
        }
        let request = request
            .with_form_opt("format", params.format.map(EditFormat::as_str))
            .with_form_opt("type", params.thread_type.map(|t| t.as_str()));
        Ok(self.fetch_object(request).await?.map(Thread::new))
    }

    /// Apply one partial edit and return the updated thread.
    ///
    /// The anchor is sent as `section_id` or `document_range` depending on the location. An
    /// edit that could only be refused (missing anchor or content) fails before any I/O.
    pub async fn edit_document(&self, thread_id: &str, edit: &DocumentEdit) -> Result<Outcome<Thread>> {
        edit.validate()?;
        let mut request = QuipRequest::post(self.config().endpoint("/threads/edit-document"))
            .with_form("thread_id", thread_id)
            .with_form("format", edit.format.as_str())
            .with_form_opt("content", edit.content.as_deref())
            .with_form("location", edit.location.wire_value().to_string());
        if let Some(anchor) = edit.anchor.as_deref() {
            if edit.location.is_section() {
                request = request.with_form("section_id", anchor);
            } else if edit.location.is_document_range() {
                request = request.with_form("document_range", anchor);
            }
        }
        Ok(self.fetch_object(request).await?.map(Thread::new))
    }

    /// Lock or unlock edits of one section.
    pub async fn lock_section_edits(
        &self,
        thread_id: &str,
        section_id: &str,
        edits_disabled: bool,
    ) -> Result<Outcome<Value>> {
        let request = QuipRequest::post(self.config().endpoint("/threads/lock-section-edits"))
            .with_form("thread_id", thread_id)
            .with_form("section_id", section_id)
            .with_form("edits_disabled", edits_disabled.to_string());
        self.fetch_object(request).await
    }

    /// Delete a thread.
    pub async fn delete_thread(&self, thread_id: &str) -> Result<Outcome<Value>> {
        let request = QuipRequest::post(self.config().endpoint("/threads/delete"))
            .with_form("thread_id", thread_id);
        self.fetch_object(request).await
    }

    /// Download a document export.
    pub async fn export_document(&self, thread_id: &str, format: ExportFormat) -> Result<Outcome<Bytes>> {
        let url = self
            .config()
            .endpoint(&format!("/threads/{}/export/{}", thread_id, format.as_str()));
        self.fetch_bytes(QuipRequest::get(url)).await
    }

    /// Download a blob attached to a thread.
    pub async fn get_blob(&self, thread_id: &str, blob_id: &str) -> Result<Outcome<Bytes>> {
        let url = self
            .config()
            .endpoint(&format!("/blob/{}/{}", thread_id, blob_id));
        self.fetch_bytes(QuipRequest::get(url)).await
    }

    /// Upload a blob into a thread. The response carries the blob `id` and `url`.
    pub async fn add_blob(
        &self,
        thread_id: &str,
        file_name: &str,
        content: Bytes,
        mime: Option<&str>,
    ) -> Result<Outcome<Value>> {
        let url = self.config().endpoint(&format!("/blob/{}", thread_id));
        let mut part = MultipartPart::file("blob", file_name, content);
        if let Some(mime) = mime {
            part = part.with_mime(mime);
        }
        self.fetch_object(QuipRequest::post(url).with_part(part)).await
    }

    /// Fetch a thread and bind it to this client for section edits.
    pub async fn open_document(&self, thread_id: &str) -> Result<Outcome<Document>> {
        let client = self.clone();
        Ok(self
            .get_thread(thread_id)
            .await?
            .map(|thread| Document::new(client, thread)))
    }
}

/// A thread snapshot bound to the client that edits it.
///
/// Each successful edit replaces the snapshot with the thread the server returns, so
/// [`Table`] indexes built from [`html`](Self::html) can always be refreshed from it.
#[derive(Clone)]
pub struct Document {
    client: QuipClient,
    thread: Thread,
}

impl Document {
    /// Bind a fetched thread to `client`.
    pub fn new(client: QuipClient, thread: Thread) -> Self {
        Document { client, thread }
    }

    /// Current snapshot.
    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// HTML of the current snapshot.
    pub fn html(&self) -> Option<&str> {
        self.thread.html()
    }

    fn thread_id(&self) -> Result<String> {
        self.thread
            .id()
            .map(str::to_owned)
            .ok_or_else(|| QuipError::InvalidEdit("thread snapshot has no id".into()))
    }

    /// Ids of the tables in the current snapshot, in document order.
    pub fn table_ids(&self) -> Vec<String> {
        self.html().map(table_ids).unwrap_or_default()
    }

    /// Index one table of the current snapshot.
    pub fn table(&self, table_id: &str) -> Option<Table> {
        Table::find(self.html()?, table_id)
    }

    /// Index every table of the current snapshot.
    pub fn tables(&self) -> Vec<Table> {
        self.html().map(Table::parse_all).unwrap_or_default()
    }

    /// Re-fetch the snapshot. Returns false when the server rejected the read.
    pub async fn reload(&mut self) -> Result<bool> {
        let thread_id = self.thread_id()?;
        match self.client.get_thread(&thread_id).await? {
            Outcome::Value(thread) => {
                self.thread = thread;
                Ok(true)
            }
            Outcome::Rejected(_) => Ok(false),
        }
    }

    /// Apply an edit and adopt the returned snapshot. Returns false when rejected.
    pub async fn edit(&mut self, edit: &DocumentEdit) -> Result<bool> {
        let thread_id = self.thread_id()?;
        match self.client.edit_document(&thread_id, edit).await? {
            Outcome::Value(thread) => {
                self.thread = thread;
                Ok(true)
            }
            Outcome::Rejected(_) => Ok(false),
        }
    }
}

#[async_trait]
impl SectionEditor for Document {
    async fn edit_section(
        &mut self,
        location: EditLocation,
        section_id: &str,
        content: Option<&str>,
    ) -> Result<Option<String>> {
        let mut edit = DocumentEdit::new(location).with_anchor(section_id);
        edit.content = content.map(str::to_owned);
        if self.edit(&edit).await? {
            Ok(self.html().map(str::to_owned))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;

    #[test]
    fn test_export_format_paths() {
        assert_eq!(ExportFormat::Docx.as_str(), "docx");
        assert_eq!(ExportFormat::Xlsx.as_str(), "xlsx");
        assert_eq!(ExportFormat::Pdf.as_str(), "pdf");
    }

    #[test]
    fn test_document_tables_from_snapshot() {
        let client = QuipClient::with_config(ClientConfig::default());
        let thread = Thread::new(serde_json::json!({
            "thread": {"id": "T1"},
            "html": "<table id='a'><tr id='r'><td id='c'>1</td></tr></table><table id='b'></table>"
        }));
        let doc = Document::new(client, thread);
        assert_eq!(doc.table_ids(), vec!["a", "b"]);
        assert_eq!(doc.table("a").unwrap().get_cell_value(0, 0), Some("1"));
        assert!(doc.table("zz").is_none());
        assert_eq!(doc.tables().len(), 2);
    }

    #[tokio::test]
    async fn test_edit_without_anchor_fails_before_io() {
        let client = QuipClient::with_config(ClientConfig::default());
        let edit = DocumentEdit::new(EditLocation::ReplaceSection).with_content("x");
        let err = client.edit_document("T1", &edit).await.unwrap_err();
        assert!(matches!(err, QuipError::InvalidEdit(_)));
    }
}
