use std::error::Error;
use std::sync::Arc;

use listwise::criteria::SortDirection;
use listwise::fetcher::{HttpRecordService, NoCredentials, ServiceOptions};
use listwise::notify::ConsoleSink;
use listwise::resource::ResourceKind;
use listwise::view::{Applied, ListView, ViewOptions};
use serde_json::Value;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let service = HttpRecordService::new(
        &ServiceOptions {
            base_url: "http://localhost:5000/api/".to_string(),
            ..ServiceOptions::default()
        },
        Arc::new(NoCredentials),
    )?;
    let kind = ResourceKind::Documents;
    let mut view: ListView<HttpRecordService, Value> = ListView::new(
        kind,
        Arc::new(service),
        Arc::new(ConsoleSink),
        ViewOptions::for_resource(kind),
    );

    view.set_search("report");
    view.set_sort("title", SortDirection::Ascending);
    if view.refresh().await == Applied::Failed {
        return Ok(());
    }
    if view.go_to_next() {
        view.sync().await;
    }

    let (first, last) = view.pager().range_label();
    println!(
        "Showing {first} to {last} of {}",
        view.pager().total_items()
    );
    for record in view.visible_items() {
        println!("{}", record["title"]);
    }
    let pages: Vec<String> = view.page_buttons().iter().map(|b| b.to_string()).collect();
    println!("Pages: {}", pages.join(" "));

    Ok(())
}
