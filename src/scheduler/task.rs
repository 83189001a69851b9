use crate::types::StreamTask;

/// Where a stream stands inside one pass.
///
/// `Pending` until first polled, `Polling` while a request is in flight,
/// then `Advanced` (more history to fetch), `CaughtUp` (watermark reached
/// the present) or `Failed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamState {
    Pending,
    Polling,
    Advanced { watermark: i64 },
    CaughtUp { watermark: i64 },
    Failed { kind: &'static str, retryable: bool },
}

impl StreamState {
    /// Whether the stream stays in the rotation after this state.
    pub fn stays_queued(&self) -> bool {
        match self {
            StreamState::Pending | StreamState::Polling | StreamState::Advanced { .. } => true,
            StreamState::CaughtUp { .. } => false,
            StreamState::Failed { retryable, .. } => *retryable,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrackedStream {
    pub task: StreamTask,
    pub state: StreamState,
    pub polls: u32,
    pub last_error: Option<String>,
}

impl TrackedStream {
    pub fn new(task: StreamTask) -> Self {
        TrackedStream {
            task,
            state: StreamState::Pending,
            polls: 0,
            last_error: None,
        }
    }
}
