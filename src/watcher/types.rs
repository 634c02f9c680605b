/// Lifecycle of a watching session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Camera acquired, no frame captured yet
    Ready,
    /// At least one `watch()` iteration has started
    Watching,
    /// The loop has stopped calling `watch()`
    ShuttingDown,
    /// Camera released
    Closed,
}
