// Presentation module - the serial consumer side of the mods view
//
// This module contains:
// - PresentationBridge: presentation thread with a serial job queue
// - ModTable / ModsView: state owned by that thread
// - ModsController: runs a reconciliation pass and feeds the view

pub mod bridge;
pub mod controller;
pub mod table;
pub mod view;

pub use bridge::{PresentationBridge, PresentationHandle, SerialExecutor};
pub use controller::{ModsController, PassSummary};
pub use table::{ModRow, ModTable};
pub use view::ModsView;
