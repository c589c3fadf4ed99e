// Application events delivered on the presentation thread

pub mod accounts;

pub use accounts::{AccountListener, AccountListenerRegistry, ListenerId};
