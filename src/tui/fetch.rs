use crate::posts::browser::FetchTicket;
use crate::posts::models::Post;
use crate::posts::source::{FetchError, PostSource};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FetchMessage {
    pub ticket: FetchTicket,
    pub outcome: Result<Vec<Post>, FetchError>,
}

pub fn spawn_fetch(source: Arc<dyn PostSource>, ticket: FetchTicket, tx: Sender<FetchMessage>) {
    let fallback_tx = tx.clone();
    let spawned = thread::Builder::new()
        .name("posts-fetch".to_string())
        .spawn(move || {
            let outcome = source.fetch_posts();
            // The receiver is gone once the UI has exited.
            if tx.send(FetchMessage { ticket, outcome }).is_err() {
                debug!("fetch result dropped, UI no longer listening");
            }
        });

    if let Err(e) = spawned {
        warn!(error = %e, "could not start fetch worker");
        let _ = fallback_tx.send(FetchMessage {
            ticket,
            outcome: Err(FetchError::Network(format!("could not start request: {}", e))),
        });
    }
}
