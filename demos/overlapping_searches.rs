use std::error::Error;
use std::sync::Arc;

use futures::future::join_all;
use listwise::fetcher::{HttpRecordService, NoCredentials, ServiceOptions};
use listwise::notify::LogSink;
use listwise::resource::ResourceKind;
use listwise::view::{Applied, ListView, ViewOptions};
use serde_json::Value;

/// Types a search one keystroke at a time with every request left in flight.
/// Whatever order the answers arrive in, only the last keystroke is shown.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let service = HttpRecordService::new(&ServiceOptions::default(), Arc::new(NoCredentials))?;
    let kind = ResourceKind::Projects;
    let mut view: ListView<HttpRecordService, Value> = ListView::new(
        kind,
        Arc::new(service),
        Arc::new(LogSink),
        ViewOptions::for_resource(kind),
    );

    let mut pending = Vec::new();
    let mut typed = String::new();
    for c in "roadmap".chars() {
        typed.push(c);
        view.set_search(&typed);
        pending.push(view.request().send());
    }

    for outcome in join_all(pending).await {
        let seq = outcome.ticket.seq();
        match view.apply(outcome) {
            Applied::Updated => println!("#{seq} shown"),
            Applied::Failed => println!("#{seq} failed"),
            Applied::Discarded => println!("#{seq} discarded"),
        }
    }
    println!("{} project(s) match '{typed}'", view.visible_items().len());

    Ok(())
}
