// ============================================================
// Layer 2 — Training Worker and Protocol Bridge
// ============================================================
// A background thread owns the whole pipeline: the records,
// the encoding context and the trained model never leave it.
// The front end talks to it only through typed messages:
//
//   front end                        worker thread
//   ─────────                        ─────────────
//   WorkerBridge ── Command ──────▶  Worker
//                ◀──── WorkerEvent ──
//
// Two pieces of state, one on each side:
//
//   Bridge gate (front end)    Untrained ─train─▶ Training
//                                  ▲                 │
//                                  └─failed/cancel───┤
//                                                    ▼
//                              Trained ◀──complete───┘
//
//     predict is only forwarded while Trained; otherwise the
//     caller gets BridgeError::ModelNotReady right away.
//
//   Worker session             NoModel | Ready(Predictor)
//
//     a train command drops the current model before the new
//     run starts, so an old model and its categories can never
//     answer once a retrain has begun.
//
// Every train request gets a generation number. The worker
// checks it between epochs: bumping it (a newer train request
// or an explicit cancel) stops the in-flight run early, and
// the bridge ignores terminal events from stale generations.
//
// A failed run, including a panic inside burn, ends with
// training-failed and leaves the worker ready for the next
// request. training-complete carries the new model's
// categories so the front end can build students it accepts.
//
// Reference: Rust Book §16 (Message Passing with mpsc)

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::application::train_use_case::{TrainResult, TrainUseCase};
use crate::data::sampler::random_student;
use crate::domain::error::{ErrorCode, PipelineError};
use crate::domain::messages::{EpochMetrics, Request, WorkerEvent};
use crate::domain::record::Record;
use crate::domain::traits::{RecordSource, TrainingObserver};
use crate::ml::predictor::Predictor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("model not ready: train the model first")]
    ModelNotReady,

    #[error("training worker has stopped")]
    WorkerGone,

    #[error("no terminal training event within {0:?}")]
    Timeout(Duration),
}

/// What the worker thread receives.
#[derive(Debug)]
enum Command {
    Train { generation: u64 },
    Predict { student: Record },
    Shutdown,
}

/// Front-end view of the worker's readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Untrained,
    Training,
    Trained,
}

enum Session {
    NoModel,
    Ready(Predictor),
}

// ─── Worker (runs on the background thread) ───────────────────────────────────
struct Worker {
    use_case: TrainUseCase,
    source: Box<dyn RecordSource + Send>,
    session: Session,
    events: Sender<WorkerEvent>,
    generation: Arc<AtomicU64>,
}

impl Worker {
    fn run(mut self, commands: Receiver<Command>) {
        tracing::debug!("Training worker started");
        for command in commands {
            match command {
                Command::Train { generation } => self.train(generation),
                Command::Predict { student } => self.predict(student),
                Command::Shutdown => break,
            }
        }
        tracing::debug!("Training worker stopped");
    }

    fn emit(&self, event: WorkerEvent) {
        // A closed channel only means nobody is listening any more
        if self.events.send(event).is_err() {
            tracing::debug!("Event dropped: front end disconnected");
        }
    }

    fn train(&mut self, generation: u64) {
        // Invalidate the previous model before anything else
        self.session = Session::NoModel;

        if self.generation.load(Ordering::SeqCst) != generation {
            // Superseded while queued
            self.emit(WorkerEvent::TrainingCancelled { generation, epochs_completed: 0 });
            return;
        }

        self.emit(WorkerEvent::Log {
            message: format!("training run {generation} started"),
        });

        let observer = ChannelObserver {
            events: &self.events,
            generation,
            current: &self.generation,
        };

        // burn reports shape and configuration problems by panicking;
        // the worker must survive them and stay ready for the next run
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.use_case.execute(self.source.as_ref(), &observer)
        }));

        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = format!("training panicked: {}", panic_message(payload.as_ref()));
                tracing::error!("Training run {} {}", generation, message);
                self.emit(WorkerEvent::TrainingFailed {
                    generation,
                    code: ErrorCode::TrainingFailed,
                    message,
                });
                return;
            }
        };

        match result {
            Ok(TrainResult::Ready(predictor)) => {
                let categories = predictor.context().category_index.categories().to_vec();
                self.session = Session::Ready(predictor);
                self.emit(WorkerEvent::TrainingComplete { generation, categories });
            }
            Ok(TrainResult::Cancelled { epochs_completed }) => {
                self.emit(WorkerEvent::TrainingCancelled { generation, epochs_completed });
            }
            Err(e) => {
                tracing::error!("Training run {} failed: {:#}", generation, e);
                let code = e
                    .downcast_ref::<PipelineError>()
                    .map_or(ErrorCode::TrainingFailed, PipelineError::code);
                self.emit(WorkerEvent::TrainingFailed {
                    generation,
                    code,
                    message: format!("{e:#}"),
                });
            }
        }
    }

    fn predict(&self, student: Record) {
        let result = match &self.session {
            Session::Ready(predictor) => predictor.predict(&student),
            Session::NoModel => Err(PipelineError::ModelNotReady),
        };

        match result {
            Ok(prediction) => self.emit(WorkerEvent::Prediction(prediction)),
            Err(e) => {
                tracing::warn!("Prediction rejected: {}", e);
                self.emit(WorkerEvent::PredictionRejected {
                    code: e.code(),
                    message: e.to_string(),
                });
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Relays training progress to the front end and watches the
/// generation counter for stop requests.
struct ChannelObserver<'a> {
    events: &'a Sender<WorkerEvent>,
    generation: u64,
    current: &'a AtomicU64,
}

impl TrainingObserver for ChannelObserver<'_> {
    fn on_progress(&self, percent: u8) {
        self.events.send(WorkerEvent::ProgressUpdate { progress: percent }).ok();
    }

    fn on_epoch_end(&self, metrics: &EpochMetrics) {
        self.events.send(WorkerEvent::TrainingLog(*metrics)).ok();
    }

    fn should_stop(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }
}

// ─── WorkerBridge (front-end handle) ──────────────────────────────────────────
pub struct WorkerBridge {
    commands: Sender<Command>,
    events: Receiver<WorkerEvent>,
    generation: Arc<AtomicU64>,
    state: GateState,
    /// Category values of the current model; empty unless Trained.
    categories: Vec<String>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerBridge {
    /// Start the worker thread. Nothing is trained until `train` is called.
    pub fn spawn(use_case: TrainUseCase, source: Box<dyn RecordSource + Send>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let generation = Arc::new(AtomicU64::new(0));

        let worker = Worker {
            use_case,
            source,
            session: Session::NoModel,
            events: event_tx,
            generation: Arc::clone(&generation),
        };

        let handle = std::thread::Builder::new()
            .name("training-worker".into())
            .spawn(move || worker.run(command_rx))
            .context("Cannot spawn training worker thread")?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            generation,
            state: GateState::Untrained,
            categories: Vec::new(),
            handle: Some(handle),
        })
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Generation of the most recent train request.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Dispatch a protocol request.
    pub fn send(&mut self, request: Request) -> Result<(), BridgeError> {
        match request {
            Request::TrainModel => self.train().map(|_| ()),
            Request::Predict { student } => self.predict(student),
        }
    }

    /// Start a new training run, superseding any run in flight.
    pub fn train(&mut self) -> Result<u64, BridgeError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state = GateState::Training;
        self.categories.clear();
        self.commands
            .send(Command::Train { generation })
            .map_err(|_| BridgeError::WorkerGone)?;
        tracing::debug!("Requested training run {}", generation);
        Ok(generation)
    }

    /// Stop the in-flight run at its next epoch boundary.
    pub fn cancel(&mut self) {
        if self.state == GateState::Training {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.state = GateState::Untrained;
        }
    }

    pub fn predict(&mut self, student: Record) -> Result<(), BridgeError> {
        if self.state != GateState::Trained {
            return Err(BridgeError::ModelNotReady);
        }
        self.commands
            .send(Command::Predict { student })
            .map_err(|_| BridgeError::WorkerGone)
    }

    /// Categories the current model was trained on.
    pub fn trained_categories(&self) -> &[String] {
        &self.categories
    }

    /// A random student the current model can encode: the gender
    /// is drawn from the trained categories.
    pub fn random_student(&self, seed: u64) -> Result<Record, BridgeError> {
        if self.state != GateState::Trained {
            return Err(BridgeError::ModelNotReady);
        }
        Ok(random_student(&mut StdRng::seed_from_u64(seed), &self.categories))
    }

    /// Update the gate from an event before handing it to the caller.
    fn observe(&mut self, event: &WorkerEvent) {
        let current = self.generation();
        match event {
            WorkerEvent::TrainingComplete { generation, categories } if *generation == current => {
                self.state = GateState::Trained;
                self.categories = categories.clone();
            }
            WorkerEvent::TrainingFailed { generation, .. }
            | WorkerEvent::TrainingCancelled { generation, .. }
                if *generation == current =>
            {
                self.state = GateState::Untrained;
            }
            _ => {}
        }
    }

    /// Next pending event, if any.
    pub fn try_recv(&mut self) -> Result<Option<WorkerEvent>, BridgeError> {
        match self.events.try_recv() {
            Ok(event) => {
                self.observe(&event);
                Ok(Some(event))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(BridgeError::WorkerGone),
        }
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<WorkerEvent>, BridgeError> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.observe(&event);
                Ok(Some(event))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::WorkerGone),
        }
    }

    /// Block until the current run ends, passing every event to
    /// `on_event`. Returns the terminal event of the current run.
    pub fn wait_for_training(
        &mut self,
        timeout: Duration,
        mut on_event: impl FnMut(&WorkerEvent),
    ) -> Result<WorkerEvent, BridgeError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BridgeError::Timeout(timeout));
            }
            let Some(event) = self.recv_timeout(remaining)? else {
                continue;
            };
            on_event(&event);
            if event.is_terminal() && self.state != GateState::Training {
                return Ok(event);
            }
        }
    }

    /// Stop the worker and wait for its thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Let any in-flight run finish at the next epoch boundary
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.commands.send(Command::Shutdown).ok();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Training worker panicked");
            }
        }
    }
}

impl Drop for WorkerBridge {
    fn drop(&mut self) {
        self.stop();
    }
}
