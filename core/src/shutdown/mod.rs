mod coordinator;
mod signals;

pub use coordinator::{CleanupCallback, ShutdownCoordinator};
pub use signals::{spawn_signal_listener, wait_for_stop_file};
