use std::collections::VecDeque;
use crate::scheduler::task::TrackedStream;
use crate::types::StreamTask;

/// Double-ended rotation of streams. Work always happens at the tail;
/// unfinished streams go back in at the head, so every stream is polled once
/// per full pass before any stream is polled twice.
#[derive(Debug, Default)]
pub struct RotationQueue {
    streams: VecDeque<TrackedStream>,
}

impl RotationQueue {
    pub fn new(tasks: impl IntoIterator<Item = StreamTask>) -> Self {
        RotationQueue {
            streams: tasks.into_iter().map(TrackedStream::new).collect(),
        }
    }

    pub fn current(&self) -> Option<&TrackedStream> {
        self.streams.back()
    }

    pub fn current_mut(&mut self) -> Option<&mut TrackedStream> {
        self.streams.back_mut()
    }

    /// Move the tail stream to the head.
    pub fn rotate(&mut self) {
        if let Some(stream) = self.streams.pop_back() {
            self.streams.push_front(stream);
        }
    }

    /// Drop the tail stream from the rotation.
    pub fn retire(&mut self) -> Option<TrackedStream> {
        self.streams.pop_back()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn tasks(&self) -> Vec<StreamTask> {
        self.streams.iter().map(|s| s.task.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedStream> {
        self.streams.iter()
    }
}
