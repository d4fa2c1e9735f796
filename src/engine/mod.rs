//! Broker workflows: create, process, and the dispatcher daemon.

pub mod create;
pub mod dispatcher;
pub mod process;

pub use create::CreateNotification;
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use process::ProcessNotification;
