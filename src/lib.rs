// modinv - Mod inventory reconciliation for game launcher instances
//
// This is the library crate: scanning, reconciliation, metadata enrichment and
// the presentation-thread plumbing. The binary crate (main.rs) runs one pass
// over an instance directory and prints the resulting table.

pub mod config;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod presentation;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use events::{AccountListener, AccountListenerRegistry};
pub use metrics::Metrics;
pub use models::{FsInstance, Instance, ModRecord, ReconciledPair, Settings};
pub use presentation::{ModsController, ModsView, PresentationBridge};
pub use state::{InventoryChange, InventoryManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
