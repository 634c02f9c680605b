mod engine;
mod session;
mod shutdown;
mod types;


pub use engine::{capture_filename, Watcher};
pub use session::CameraSession;
pub use shutdown::ShutdownToken;
pub use types::WatcherState;
