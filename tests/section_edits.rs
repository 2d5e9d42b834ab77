//! Table edits through the `SectionEditor` seam: an in-memory sheet for the edit rules and a
//! mock API server for the `Document` implementation.

use async_trait::async_trait;
use mockito::{Matcher, Server};
use quip_client::section::{create_table_html, escape};
use quip_client::{
    ClientConfig, EditLocation, Outcome, QuipClient, QuipError, Result, SectionEditor, Table,
};
use scraper::Html;

/// Server-side sheet that assigns ids and returns a fresh snapshot after every edit.
struct FakeSheet {
    headers: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
    next_row: usize,
    calls: Vec<(EditLocation, String, Option<String>)>,
    reject: bool,
    fail: bool,
}

impl FakeSheet {
    fn new(headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut sheet = FakeSheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            next_row: 1,
            calls: Vec::new(),
            reject: false,
            fail: false,
        };
        for row in rows {
            let id = sheet.new_row_id();
            sheet
                .rows
                .push((id, row.iter().map(|c| c.to_string()).collect()));
        }
        sheet
    }

    fn new_row_id(&mut self) -> String {
        let id = format!("r{}", self.next_row);
        self.next_row += 1;
        id
    }

    fn html(&self) -> String {
        let mut html = String::from(r#"<h1>Budget</h1><table id="t"><thead><tr>"#);
        for (i, header) in self.headers.iter().enumerate() {
            html.push_str(&format!(r#"<th id="h{}">{}</th>"#, i, escape(header)));
        }
        html.push_str("</tr></thead><tbody>");
        for (id, cells) in &self.rows {
            html.push_str(&format!(r#"<tr id="{}">"#, id));
            for (i, cell) in cells.iter().enumerate() {
                html.push_str(&format!(r#"<td id="{}c{}">{}</td>"#, id, i, escape(cell)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }

    fn table(&self) -> Table {
        Table::find(&self.html(), "t").unwrap()
    }

    fn position(&self, row_id: &str) -> usize {
        self.rows.iter().position(|(id, _)| id == row_id).unwrap()
    }
}

fn text_of(fragment: &str) -> String {
    Html::parse_fragment(fragment).root_element().text().collect()
}

fn cells_of(fragment: &str) -> Vec<String> {
    let table = &Table::parse_all(&format!("<table>{}</table>", fragment))[0];
    (0..table.column_count())
        .map(|i| table.get_cell_value(i, 0).unwrap_or("").to_string())
        .collect()
}

#[async_trait]
impl SectionEditor for FakeSheet {
    async fn edit_section(
        &mut self,
        location: EditLocation,
        section_id: &str,
        content: Option<&str>,
    ) -> Result<Option<String>> {
        self.calls
            .push((location, section_id.to_string(), content.map(str::to_string)));
        if self.fail {
            return Err(QuipError::Http("connection reset".into()));
        }
        if self.reject {
            return Ok(None);
        }
        match location {
            EditLocation::ReplaceSection => {
                let (row_id, column) = section_id.rsplit_once('c').unwrap();
                let column: usize = column.parse().unwrap();
                let at = self.position(row_id);
                self.rows[at].1[column] = text_of(content.unwrap());
            }
            EditLocation::AfterSection | EditLocation::BeforeSection => {
                let mut at = self.position(section_id);
                if location == EditLocation::AfterSection {
                    at += 1;
                }
                let id = self.new_row_id();
                self.rows.insert(at, (id, cells_of(content.unwrap())));
            }
            EditLocation::DeleteSection => {
                let at = self.position(section_id);
                self.rows.remove(at);
            }
            other => panic!("unexpected location {:?}", other),
        }
        Ok(Some(self.html()))
    }
}

#[tokio::test]
async fn test_update_cell_refreshes_from_snapshot() {
    let mut sheet = FakeSheet::new(&["Item", "Cost"], &[&["rent", "900"], &["food", "300"]]);
    let mut table = sheet.table();

    assert!(table.update_cell_value(&mut sheet, 1, 1, "<350>").await.unwrap());

    assert!(!table.is_stale());
    assert_eq!(table.get_cell_value(1, 1), Some("<350>"));
    assert_eq!(table.get_cell_value(1, 0), Some("900"));
    assert_eq!(
        sheet.calls,
        vec![(
            EditLocation::ReplaceSection,
            "r2c1".to_string(),
            Some("&lt;350&gt;".to_string())
        )]
    );
}

#[tokio::test]
async fn test_add_row_anchors_after_last_row() {
    let mut sheet = FakeSheet::new(&["Item", "Cost"], &[&["rent", "900"], &["food", "300"]]);
    let mut table = sheet.table();

    assert!(table.add_row(&mut sheet, &["fuel"]).await.unwrap());

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.get_cell_value(0, 2), Some("fuel"));
    assert_eq!(table.get_cell_value(1, 2), Some(""));
    let (location, anchor, content) = &sheet.calls[0];
    assert_eq!(*location, EditLocation::AfterSection);
    assert_eq!(anchor, "r2");
    assert_eq!(
        content.as_deref(),
        Some("<tr><td>fuel</td><td></td></tr>")
    );
}

#[tokio::test]
async fn test_add_row_at_inserts_before_index() {
    let mut sheet = FakeSheet::new(&["Item"], &[&["rent"], &["food"]]);
    let mut table = sheet.table();

    assert!(table.add_row_at(&mut sheet, 0, &["first"]).await.unwrap());

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.get_cell_value(0, 0), Some("first"));
    assert_eq!(table.get_cell_value(0, 1), Some("rent"));
    assert_eq!(sheet.calls[0].0, EditLocation::BeforeSection);
    assert_eq!(sheet.calls[0].1, "r1");

    let err = table.add_row_at(&mut sheet, 7, &["x"]).await.unwrap_err();
    assert!(matches!(err, QuipError::InvalidEdit(_)));
}

#[tokio::test]
async fn test_remove_last_remaining_row_is_refused() {
    let mut sheet = FakeSheet::new(&["Item"], &[&["only"]]);
    let mut table = sheet.table();

    let err = table.remove_row(&mut sheet, 0).await.unwrap_err();
    assert!(matches!(err, QuipError::InvalidEdit(_)));
    assert_eq!(table.row_count(), 1);
    assert!(!table.is_stale());
    assert!(sheet.calls.is_empty());
}

#[tokio::test]
async fn test_remove_row() {
    let mut sheet = FakeSheet::new(&["Item"], &[&["rent"], &["food"]]);
    let mut table = sheet.table();

    assert!(table.remove_row(&mut sheet, 0).await.unwrap());
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.get_cell_value(0, 0), Some("food"));
    assert_eq!(sheet.calls[0], (EditLocation::DeleteSection, "r1".into(), None));
}

#[tokio::test]
async fn test_rejected_edit_keeps_index() {
    let mut sheet = FakeSheet::new(&["Item"], &[&["rent"]]);
    sheet.reject = true;
    let mut table = sheet.table();

    assert!(!table.update_cell_value(&mut sheet, 0, 0, "x").await.unwrap());
    assert!(!table.is_stale());
    assert_eq!(table.get_cell_value(0, 0), Some("rent"));
}

#[tokio::test]
async fn test_failed_edit_leaves_index_stale_until_refresh() {
    let mut sheet = FakeSheet::new(&["Item"], &[&["rent"], &["food"]]);
    sheet.fail = true;
    let mut table = sheet.table();

    assert!(table.update_cell_value(&mut sheet, 0, 0, "x").await.is_err());
    assert!(table.is_stale());
    assert_eq!(table.get_cell_value(0, 0), None);
    assert_eq!(table.get_column_header(0), None);

    let err = table.remove_row(&mut sheet, 0).await.unwrap_err();
    assert!(matches!(err, QuipError::StaleIndex));
    assert_eq!(sheet.calls.len(), 1);

    assert!(table.refresh(&sheet.html()));
    assert_eq!(table.get_cell_value(0, 0), Some("rent"));
    assert_eq!(table.get_column_header(0), Some("Item"));
}

#[tokio::test]
async fn test_cells_without_ids_cannot_anchor() {
    let mut sheet = FakeSheet::new(&["A"], &[&["x"]]);
    let html = create_table_html(&["A", "B"], &[vec!["x", "y"]]);
    let mut table = Table::parse_all(&html).remove(0);

    assert_eq!(table.get_column_header(0), Some("A"));
    assert_eq!(table.get_cell_value(1, 0), Some("y"));
    let err = table.update_cell_value(&mut sheet, 1, 0, "z").await.unwrap_err();
    assert!(matches!(err, QuipError::InvalidEdit(_)));
    assert!(sheet.calls.is_empty());
}

#[tokio::test]
async fn test_out_of_range_and_empty_tables() {
    let mut sheet = FakeSheet::new(&["Item"], &[&["rent"]]);
    let mut table = sheet.table();
    let err = table.update_cell_value(&mut sheet, 3, 0, "x").await.unwrap_err();
    assert!(matches!(err, QuipError::InvalidEdit(_)));
    assert_eq!(table.get_cell_value(3, 0), None);

    let empty = FakeSheet::new(&["Item"], &[]);
    let mut table = empty.table();
    assert_eq!(table.row_count(), 0);
    let err = table.add_row(&mut sheet, &["x"]).await.unwrap_err();
    assert!(matches!(err, QuipError::InvalidEdit(_)));
}

const BEFORE: &str = r#"<table id='s:T'><thead><tr><th id='s:h0'>A</th><th id='s:h1'>B</th></tr></thead><tbody><tr id='s:r1'><td id='s:r1_0'>x</td><td id='s:r1_1'>y</td></tr></tbody></table>"#;
const AFTER: &str = r#"<table id='s:T'><thead><tr><th id='s:h0'>A</th><th id='s:h1'>B</th></tr></thead><tbody><tr id='s:r1'><td id='s:r1_0'>x</td><td id='s:r1_1'>42</td></tr></tbody></table>"#;

fn thread_json(html: &str) -> String {
    serde_json::json!({ "thread": { "id": "T1", "type": "spreadsheet" }, "html": html }).to_string()
}

#[tokio::test]
async fn test_document_edits_through_api() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/threads/T1")
        .with_status(200)
        .with_body(thread_json(BEFORE))
        .create_async()
        .await;
    let edit = server
        .mock("POST", "/threads/edit-document")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("thread_id".into(), "T1".into()),
            Matcher::UrlEncoded("format".into(), "html".into()),
            Matcher::UrlEncoded("location".into(), "4".into()),
            Matcher::UrlEncoded("section_id".into(), "s:r1_1".into()),
            Matcher::UrlEncoded("content".into(), "42".into()),
        ]))
        .with_status(200)
        .with_body(thread_json(AFTER))
        .expect(1)
        .create_async()
        .await;

    let client = QuipClient::with_config(ClientConfig {
        base_url: server.url(),
        access_token: Some("tok".into()),
        ..Default::default()
    });
    let mut doc = match client.open_document("T1").await.unwrap() {
        Outcome::Value(doc) => doc,
        Outcome::Rejected(envelope) => panic!("rejected: {}", envelope),
    };
    assert_eq!(doc.table_ids(), vec!["s:T"]);

    let mut table = doc.table("s:T").unwrap();
    assert_eq!(table.get_cell_value(1, 0), Some("y"));
    assert!(table.update_cell_value(&mut doc, 1, 0, "42").await.unwrap());

    assert_eq!(table.get_cell_value(1, 0), Some("42"));
    assert_eq!(doc.table("s:T").unwrap().get_cell_value(1, 0), Some("42"));
    edit.assert_async().await;
}
