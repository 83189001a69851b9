//! Continuous polling of every configured (api, exchange, pair) stream.

pub mod poller;
pub mod queue;
pub mod runner;
pub mod task;
pub mod throttle;

pub use poller::Poller;
pub use queue::RotationQueue;
pub use runner::{IngestionService, PassEnd, PassReport, Scheduler};
pub use task::{StreamState, TrackedStream};
