use std::sync::Arc;
use tokio::sync::mpsc;

use crate::clock::Clock;
use crate::models::RelayJob;
use crate::registry::GuardRegistry;

// app's shared state
pub struct AppState {
    pub registry: Arc<GuardRegistry>,
    pub clock: Arc<dyn Clock>,
    pub relay_tx: mpsc::Sender<RelayJob>,
    // take the visitor address from X-Forwarded-For
    pub trust_forwarded: bool,
}
