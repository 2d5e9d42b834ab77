//! Dump the first table of a document, then edit it by coordinates.
//!
//! ```sh
//! QUIP_ACCESS_TOKEN=... cargo run --example table_edit -- <thread-id>
//! ```

use anyhow::{bail, Context, Result};
use quip_client::{ClientConfig, Outcome, QuipClient, Table};

fn dump(table: &Table) {
    let headers: Vec<&str> = (0..table.column_count())
        .map(|c| table.get_column_header(c).unwrap_or("-"))
        .collect();
    println!("{}", headers.join(" | "));
    for row in 0..table.row_count() {
        let cells: Vec<&str> = (0..table.column_count())
            .map(|c| table.get_cell_value(c, row).unwrap_or(""))
            .collect();
        println!("{}", cells.join(" | "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let thread_id = std::env::args()
        .nth(1)
        .context("usage: table_edit <thread-id>")?;

    let client = QuipClient::with_config(ClientConfig::from_env());
    let mut doc = match client.open_document(&thread_id).await? {
        Outcome::Value(doc) => doc,
        Outcome::Rejected(envelope) => bail!("cannot read {}: {}", thread_id, envelope),
    };

    let table_id = doc
        .table_ids()
        .into_iter()
        .next()
        .context("document has no table with an id")?;
    let mut table = doc.table(&table_id).context("table vanished")?;
    dump(&table);

    let first = table.get_cell_value(0, 0).unwrap_or("").to_string();
    if !table
        .update_cell_value(&mut doc, 0, 0, &format!("{} (edited)", first))
        .await?
    {
        bail!("edit rejected");
    }
    table.add_row(&mut doc, &["added by table_edit"]).await?;

    println!();
    dump(&table);
    Ok(())
}
