mod client;
mod contact;
mod health;
mod metrics;

pub use client::ClientAddr;
pub use contact::{check_handler, contact_handler, stamp_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
