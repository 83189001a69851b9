use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;
use crate::config::SchedulerConfig;
use crate::controls::ShutdownSignal;
use crate::error::{Error, Result};
use crate::interfaces::CandleSink;
use crate::observability::metrics::{
    CANDLES_INGESTED, PERSISTENCE_FAILURES, POLLS_TOTAL, POLL_FAILURES, STREAMS_CAUGHT_UP,
};
use crate::observability::tracing::{trace_api_worker, trace_stream_poll};
use crate::scheduler::poller::Poller;
use crate::scheduler::queue::RotationQueue;
use crate::scheduler::task::StreamState;
use crate::scheduler::throttle::RequestThrottle;
use crate::types::StreamTask;
use crate::utils::helper::current_timestamp_secs;
use crate::utils::task_supervisor::TaskSupervisor;

/// Why a pass stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassEnd {
    /// Every stream caught up or was abandoned.
    QueueEmpty,
    /// The iteration budget ran out with streams still queued.
    BudgetExhausted,
    /// The shutdown signal fired.
    Interrupted,
}

/// Outcome of one bounded run over the work queue.
#[derive(Clone, Debug)]
pub struct PassReport {
    pub end: PassEnd,
    pub iterations: usize,
    pub candles_stored: usize,
    pub caught_up: Vec<StreamTask>,
    /// Streams dropped for configuration errors, with the error text.
    pub abandoned: Vec<(StreamTask, String)>,
    /// Streams still queued when the pass stopped, tail first.
    pub remaining: Vec<StreamTask>,
}

impl PassReport {
    fn merge(mut self, other: PassReport) -> PassReport {
        self.end = match (self.end, other.end) {
            (PassEnd::Interrupted, _) | (_, PassEnd::Interrupted) => PassEnd::Interrupted,
            (PassEnd::BudgetExhausted, _) | (_, PassEnd::BudgetExhausted) => PassEnd::BudgetExhausted,
            _ => PassEnd::QueueEmpty,
        };
        self.iterations += other.iterations;
        self.candles_stored += other.candles_stored;
        self.caught_up.extend(other.caught_up);
        self.abandoned.extend(other.abandoned);
        self.remaining.extend(other.remaining);
        self
    }

    fn empty() -> PassReport {
        PassReport {
            end: PassEnd::QueueEmpty,
            iterations: 0,
            candles_stored: 0,
            caught_up: Vec::new(),
            abandoned: Vec::new(),
            remaining: Vec::new(),
        }
    }
}

/// Round-robin poller over one rotation queue.
///
/// One poll is in flight at a time. Failures of a single stream never end
/// the pass: network and storage errors rotate the stream, configuration
/// errors drop it.
pub struct Scheduler {
    poller: Poller,
    sink: Arc<dyn CandleSink>,
    config: SchedulerConfig,
    queue: RotationQueue,
    throttles: BTreeMap<String, RequestThrottle>,
    shutdown: ShutdownSignal,
}

impl Scheduler {
    /// Queue every stream in the poller's registry.
    pub fn new(poller: Poller, sink: Arc<dyn CandleSink>, config: SchedulerConfig, shutdown: ShutdownSignal) -> Self {
        let tasks = poller.registry().stream_tasks();
        Self::with_tasks(poller, sink, config, shutdown, tasks)
    }

    pub fn with_tasks(
        poller: Poller,
        sink: Arc<dyn CandleSink>,
        config: SchedulerConfig,
        shutdown: ShutdownSignal,
        tasks: Vec<StreamTask>,
    ) -> Self {
        let throttles = poller.registry()
            .apis()
            .filter_map(|api| {
                let profile = poller.registry().lookup(api).ok()?;
                let (max, window) = profile.rate_window()?;
                Some((api.to_string(), RequestThrottle::new(max, window)))
            })
            .collect();

        Scheduler {
            poller,
            sink,
            config,
            queue: RotationQueue::new(tasks),
            throttles,
            shutdown,
        }
    }

    pub fn queue(&self) -> &RotationQueue {
        &self.queue
    }

    pub async fn run_one_pass(&mut self, max_iterations: usize) -> PassReport {
        self.run_one_pass_at(current_timestamp_secs(), max_iterations).await
    }

    /// Run at most `max_iterations` polls, treating `now` as the present.
    pub async fn run_one_pass_at(&mut self, now: i64, max_iterations: usize) -> PassReport {
        let mut report = PassReport::empty();
        let period = self.config.period_secs;

        report.end = loop {
            if self.queue.is_empty() {
                break PassEnd::QueueEmpty;
            }
            if self.shutdown.is_triggered() {
                tracing::warn!("Shutdown requested, leaving {} streams queued", self.queue.len());
                break PassEnd::Interrupted;
            }
            if report.iterations >= max_iterations {
                break PassEnd::BudgetExhausted;
            }
            report.iterations += 1;

            let Some((task, previous)) = self.queue.current().map(|s| (s.task.clone(), s.state.clone())) else {
                break PassEnd::QueueEmpty;
            };
            let Some(state) = self.step(&task, now, period, &mut report).await else {
                // Stopped while waiting for a request slot; nothing was sent.
                report.iterations -= 1;
                if let Some(stream) = self.queue.current_mut() {
                    stream.state = previous;
                }
                tracing::warn!("Shutdown requested while {} waited on its rate limit", task);
                break PassEnd::Interrupted;
            };

            let retire = !state.stays_queued();
            if let Some(stream) = self.queue.current_mut() {
                stream.polls += 1;
                stream.state = state;
            }
            if retire {
                self.queue.retire();
            } else {
                self.queue.rotate();
            }
        };

        report.remaining = self.queue.tasks().into_iter().rev().collect();
        tracing::info!(
            "Pass finished ({:?}) after {} iterations: {} caught up, {} abandoned, {} remaining, {} candles stored",
            report.end,
            report.iterations,
            report.caught_up.len(),
            report.abandoned.len(),
            report.remaining.len(),
            report.candles_stored
        );
        report
    }

    /// Poll one stream and decide its next state. `None` when shutdown fired
    /// before the request went out.
    async fn step(&mut self, task: &StreamTask, now: i64, period: i64, report: &mut PassReport) -> Option<StreamState> {
        if let Some(stream) = self.queue.current_mut() {
            stream.state = StreamState::Polling;
        }

        let start = match self.sink.latest_timestamp(&task.exchange_id, &task.trading_pair).await {
            Ok(watermark) => watermark.unwrap_or(self.config.start_timestamp),
            Err(e) => return Some(self.fail(task, e, report)),
        };

        let limit = self.poller.registry()
            .lookup(&task.api)
            .ok()
            .and_then(|profile| profile.limit)
            .unwrap_or(self.config.default_limit);

        if let Some(throttle) = self.throttles.get_mut(&task.api) {
            tokio::select! {
                _ = throttle.acquire() => {}
                _ = self.shutdown.triggered() => return None,
            }
        }

        POLLS_TOTAL.with_label_values(&[task.api.as_str()]).inc();
        let polled = self.poller
            .poll(task, start, limit, period)
            .instrument(trace_stream_poll(task, start))
            .await;

        let result = match polled {
            Ok(result) => result,
            Err(e) => return Some(self.fail(task, e, report)),
        };

        let watermark = result.last_timestamp;
        let stored = result.candles.len();
        if let Err(e) = self.sink.store(result).await {
            PERSISTENCE_FAILURES.inc();
            tracing::error!("Failed to store {} candles for {}: {}", stored, task, e);
            if let Some(stream) = self.queue.current_mut() {
                stream.last_error = Some(e.to_string());
            }
            return Some(StreamState::Failed { kind: e.kind(), retryable: true });
        }
        CANDLES_INGESTED.with_label_values(&[task.api.as_str()]).inc_by(stored as u64);
        report.candles_stored += stored;

        if watermark >= now - period {
            STREAMS_CAUGHT_UP.inc();
            tracing::info!("{} caught up at {}", task, watermark);
            report.caught_up.push(task.clone());
            Some(StreamState::CaughtUp { watermark })
        } else {
            tracing::info!("{} advanced to {}", task, watermark);
            Some(StreamState::Advanced { watermark })
        }
    }

    fn fail(&mut self, task: &StreamTask, error: Error, report: &mut PassReport) -> StreamState {
        POLL_FAILURES.with_label_values(&[task.api.as_str(), error.kind()]).inc();
        let retryable = error.is_retryable();

        if retryable {
            tracing::warn!("Poll failed for {}, retrying next rotation: {}", task, error);
        } else {
            tracing::error!("Abandoning {} for this pass: {}", task, error);
            report.abandoned.push((task.clone(), error.to_string()));
        }

        if let Some(stream) = self.queue.current_mut() {
            stream.last_error = Some(error.to_string());
        }
        StreamState::Failed { kind: error.kind(), retryable }
    }
}

/// Runs ingestion either as one shared queue or as one worker per API.
pub struct IngestionService {
    poller: Poller,
    sink: Arc<dyn CandleSink>,
    config: SchedulerConfig,
    shutdown: ShutdownSignal,
}

impl IngestionService {
    pub fn new(poller: Poller, sink: Arc<dyn CandleSink>, config: SchedulerConfig, shutdown: ShutdownSignal) -> Self {
        IngestionService { poller, sink, config, shutdown }
    }

    pub async fn run(&self, max_iterations: usize) -> Result<PassReport> {
        if self.config.per_api_workers {
            self.run_per_api(max_iterations).await
        } else {
            Ok(self.run_single_queue(max_iterations).await)
        }
    }

    /// Every stream of every API in one rotation.
    pub async fn run_single_queue(&self, max_iterations: usize) -> PassReport {
        let mut scheduler = Scheduler::new(
            self.poller.clone(),
            self.sink.clone(),
            self.config.clone(),
            self.shutdown.clone(),
        );
        scheduler.run_one_pass(max_iterations).await
    }

    /// One worker per API, each with its own rotation and its own budget.
    /// Requests to one API are still strictly sequential.
    pub async fn run_per_api(&self, max_iterations: usize) -> Result<PassReport> {
        let mut supervisor = TaskSupervisor::new();

        for api in self.poller.registry().apis() {
            let tasks = self.poller.registry().stream_tasks_for(api)?;
            if tasks.is_empty() {
                continue;
            }
            let mut scheduler = Scheduler::with_tasks(
                self.poller.clone(),
                self.sink.clone(),
                self.config.clone(),
                self.shutdown.clone(),
                tasks,
            );
            let span = trace_api_worker(api);
            supervisor.spawn(api, async move {
                Ok(scheduler.run_one_pass(max_iterations).await)
            }.instrument(span));
        }
        tracing::info!("Started {} API workers", supervisor.active_task_count());

        let mut merged = PassReport::empty();
        for (api, outcome) in supervisor.join_all().await {
            match outcome {
                Ok(report) => merged = merged.merge(report),
                Err(e) => {
                    tracing::error!("Worker for {} failed: {}", api, e);
                    return Err(e);
                }
            }
        }
        Ok(merged)
    }
}
