//! HTML fragments sent as edit content, and identifier listing.

use scraper::{Html, Selector};

pub(crate) fn selector(css: &'static str) -> Selector {
    // Only called with literal selectors.
    Selector::parse(css).expect("static CSS selector")
}

/// Escape text for use inside an element body.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One `<tr>` with a `<td>` per value.
pub fn row_html<S: AsRef<str>>(values: &[S]) -> String {
    let mut html = String::from("<tr>");
    for value in values {
        html.push_str("<td>");
        html.push_str(&escape(value.as_ref()));
        html.push_str("</td>");
    }
    html.push_str("</tr>");
    html
}

/// Build a complete table with a header row.
///
/// Rows shorter than the header are padded with empty cells.
///
/// ```
/// use quip_client::section::{create_table_html, Table};
///
/// let html = create_table_html(&["A", "B"], &[vec!["x", "y"]]);
/// let table = &Table::parse_all(&html)[0];
/// assert_eq!(table.get_column_header(0), Some("A"));
/// assert_eq!(table.get_cell_value(1, 0), Some("y"));
/// ```
pub fn create_table_html<H, C>(headers: &[H], rows: &[Vec<C>]) -> String
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    let mut html = String::from("<table><thead><tr>");
    for header in headers {
        html.push_str("<th>");
        html.push_str(&escape(header.as_ref()));
        html.push_str("</th>");
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        let mut values: Vec<&str> = row.iter().map(AsRef::as_ref).collect();
        if values.len() < headers.len() {
            values.resize(headers.len(), "");
        }
        html.push_str(&row_html(&values));
    }
    html.push_str("</tbody></table>");
    html
}

/// Build a table of empty cells with spreadsheet-style column letters as headers.
pub fn create_blank_table_html(columns: usize, rows: usize) -> String {
    let headers: Vec<String> = (0..columns).map(column_letter).collect();
    let blank = vec![vec![""; columns]; rows];
    create_table_html(&headers, &blank)
}

/// `0 -> A`, `25 -> Z`, `26 -> AA`.
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Identifiers of every table in the snapshot, in document order.
///
/// Tables without an `id` attribute are skipped.
pub fn table_ids(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&selector("table"))
        .filter_map(|table| table.value().attr("id"))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_row_html() {
        assert_eq!(row_html(&["1", "<2>"]), "<tr><td>1</td><td>&lt;2&gt;</td></tr>");
    }

    #[test]
    fn test_create_table_closes_table() {
        let html = create_table_html(&["A"], &[vec!["x"]]);
        assert!(html.starts_with("<table><thead>"));
        assert!(html.ends_with("</tbody></table>"));
    }

    #[test]
    fn test_short_rows_padded() {
        let html = create_table_html(&["A", "B"], &[vec!["x"]]);
        assert!(html.contains("<tr><td>x</td><td></td></tr>"));
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_blank_table() {
        let html = create_blank_table_html(2, 3);
        assert!(html.contains("<th>A</th><th>B</th>"));
        assert_eq!(html.matches("<td></td>").count(), 6);
    }

    #[test]
    fn test_table_ids_in_order() {
        let html = r#"<p>x</p><table id="t1"><tr><td>a</td></tr></table>
            <table><tr><td>b</td></tr></table>
            <table id="t2"><tr><td>c</td></tr></table>"#;
        assert_eq!(table_ids(html), vec!["t1", "t2"]);
    }
}
