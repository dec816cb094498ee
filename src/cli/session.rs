// ============================================================
// Layer 1 — Interactive Session
// ============================================================
// A line-oriented front end over the background worker. Like
// the original page, it starts a training run as soon as it
// opens, streams progress while the user types, and only lets
// predictions through once a model is ready.
//
// Input (one per line):
//   train                 start (or restart) training
//   predict {json}        predict for the given student object
//   random [seed]         predict for a randomly generated student
//   cancel                stop the current training run
//   status                show the gate state
//   quit                  leave the session
//   {"action": ...}       a raw protocol request
//
// Stdin is read on its own thread so worker events keep
// printing while the prompt waits for input.

use anyhow::{Context, Result};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use crate::application::train_use_case::TrainUseCase;
use crate::application::worker::{BridgeError, GateState, WorkerBridge};
use crate::cli::commands::SessionArgs;
use crate::cli::render_prediction;
use crate::data::loader::CsvSource;
use crate::domain::error::ErrorCode;
use crate::domain::messages::{Request, WorkerEvent};
use crate::domain::record::Record;

const POLL: Duration = Duration::from_millis(50);

/// One parsed line of user input.
#[derive(Debug, PartialEq)]
enum Input {
    Request(Request),
    Random(Option<u64>),
    Cancel,
    Status,
    Quit,
    Empty,
}

fn parse_input(line: &str) -> Result<Input> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if line.starts_with('{') {
        let request = serde_json::from_str(line).context("Not a valid request")?;
        return Ok(Input::Request(request));
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match word {
        "train" => Ok(Input::Request(Request::TrainModel)),
        "predict" => {
            let student: Record = serde_json::from_str(rest)
                .context("usage: predict {\"field\": value, ...}")?;
            Ok(Input::Request(Request::Predict { student }))
        }
        "random" if rest.is_empty() => Ok(Input::Random(None)),
        "random" => Ok(Input::Random(Some(rest.parse().context("usage: random [seed]")?))),
        "cancel" => Ok(Input::Cancel),
        "status" => Ok(Input::Status),
        "quit" | "exit" => Ok(Input::Quit),
        other => anyhow::bail!("unknown command '{other}'"),
    }
}

/// Text for one worker event, or None for events not worth a line.
fn render_event(event: &WorkerEvent) -> Option<String> {
    match event {
        WorkerEvent::ProgressUpdate { progress } => Some(format!("[{progress:>3}%]")),
        WorkerEvent::TrainingLog(m) => Some(format!(
            "epoch {:>3} | loss={:.5} mae={:.5} | val_loss={:.5} val_mae={:.5}",
            m.epoch + 1,
            m.loss,
            m.mae,
            m.val_loss,
            m.val_mae
        )),
        WorkerEvent::TrainingComplete { .. } => Some("Model ready. Predictions enabled.".into()),
        WorkerEvent::TrainingFailed { message, .. } => Some(format!("Training failed: {message}")),
        WorkerEvent::TrainingCancelled { epochs_completed, .. } => {
            Some(format!("Training cancelled after {epochs_completed} epochs."))
        }
        WorkerEvent::Prediction(p) => Some(render_prediction(p)),
        WorkerEvent::PredictionRejected { message, .. } => {
            Some(format!("Prediction rejected: {message}"))
        }
        WorkerEvent::Log { .. } => None,
    }
}

fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Cannot spawn stdin reader")?;
    Ok(rx)
}

struct Session {
    bridge: WorkerBridge,
    json: bool,
    random_seed: u64,
    /// Predictions sent and not yet answered.
    pending: usize,
}

impl Session {
    fn print_event(&self, event: &WorkerEvent) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else if let Some(text) = render_event(event) {
            println!("{text}");
        }
        Ok(())
    }

    fn receive(&mut self, event: &WorkerEvent) -> Result<()> {
        if matches!(event, WorkerEvent::Prediction(_) | WorkerEvent::PredictionRejected { .. }) {
            self.pending = self.pending.saturating_sub(1);
        }
        self.print_event(event)
    }

    fn drain_events(&mut self) -> Result<()> {
        while let Some(event) = self.bridge.recv_timeout(POLL)? {
            self.receive(&event)?;
        }
        Ok(())
    }

    /// Nothing in flight: no training run and no unanswered prediction.
    fn is_idle(&self) -> bool {
        self.bridge.state() != GateState::Training && self.pending == 0
    }

    /// Keep printing events until the worker has nothing left to say.
    /// Used when input ends, so piped sessions see their results.
    fn finish(&mut self) -> Result<()> {
        while !self.is_idle() {
            if let Some(event) = self.bridge.recv_timeout(POLL)? {
                self.receive(&event)?;
            }
        }
        self.drain_events()
    }

    fn reject_not_ready(&self) -> Result<()> {
        let rejected = WorkerEvent::PredictionRejected {
            code: ErrorCode::ModelNotReady,
            message: BridgeError::ModelNotReady.to_string(),
        };
        self.print_event(&rejected)
    }

    fn send(&mut self, request: Request) -> Result<()> {
        let is_predict = matches!(request, Request::Predict { .. });
        match self.bridge.send(request) {
            Ok(()) => {
                if is_predict {
                    self.pending += 1;
                }
                Ok(())
            }
            Err(BridgeError::ModelNotReady) => self.reject_not_ready(),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns false once the user asked to leave.
    fn handle(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Request(request) => self.send(request)?,
            Input::Random(seed) => {
                let seed = seed.unwrap_or_else(|| {
                    self.random_seed += 1;
                    self.random_seed
                });
                match self.bridge.random_student(seed) {
                    Ok(student) => self.send(Request::Predict { student })?,
                    Err(BridgeError::ModelNotReady) => self.reject_not_ready()?,
                    Err(e) => return Err(e.into()),
                }
            }
            Input::Cancel => {
                self.bridge.cancel();
                println!("Cancel requested.");
            }
            Input::Status => {
                let state = match self.bridge.state() {
                    GateState::Untrained => "untrained",
                    GateState::Training => "training",
                    GateState::Trained => "trained",
                };
                println!("model: {state} (run {})", self.bridge.generation());
            }
            Input::Quit => return Ok(false),
            Input::Empty => {}
        }
        Ok(true)
    }
}

/// Handles the `session` subcommand.
pub fn run(args: SessionArgs) -> Result<()> {
    let use_case = TrainUseCase::new(args.train.into());
    let source = CsvSource::new(&use_case.config().data_path, use_case.schema().clone());
    let seed = use_case.config().seed;
    let bridge = WorkerBridge::spawn(use_case, Box::new(source))?;

    let mut session = Session { bridge, json: args.json, random_seed: seed, pending: 0 };
    if !args.no_auto_train {
        session.bridge.train()?;
    }

    let lines = spawn_stdin_reader()?;
    loop {
        session.drain_events()?;
        match lines.try_recv() {
            Ok(line) => match parse_input(&line) {
                Ok(input) => {
                    if !session.handle(input)? {
                        break;
                    }
                }
                Err(e) => eprintln!("{e:#}"),
            },
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                session.finish()?;
                break;
            }
        }
    }

    session.bridge.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::tests::{tiny_config, toy_records, toy_schema, VecSource};
    use crate::domain::messages::EpochMetrics;

    fn toy_session() -> Session {
        let use_case = TrainUseCase::new(tiny_config()).with_schema(toy_schema());
        let source = VecSource(toy_records(30, &["F", "M"]));
        let bridge = WorkerBridge::spawn(use_case, Box::new(source)).unwrap();
        Session { bridge, json: true, random_seed: 0, pending: 0 }
    }

    #[test]
    fn test_finish_waits_for_training_and_answers() {
        let mut session = toy_session();
        assert!(session.handle(Input::Request(Request::TrainModel)).unwrap());
        assert!(!session.is_idle());
        session.finish().unwrap();
        assert_eq!(session.bridge.state(), GateState::Trained);

        let student = Record::new().with("hours", 2.0).with("sleep", 7.0).with("gender", "F");
        session.handle(Input::Request(Request::Predict { student })).unwrap();
        // Unknown gender still gets an answer that must be waited for
        let stranger = Record::new().with("hours", 2.0).with("sleep", 7.0).with("gender", "Q");
        session.handle(Input::Request(Request::Predict { student: stranger })).unwrap();
        assert_eq!(session.pending, 2);

        session.finish().unwrap();
        assert_eq!(session.pending, 0);
        assert!(session.is_idle());
    }

    #[test]
    fn test_predict_before_training_is_not_counted() {
        let mut session = toy_session();
        let student = Record::new().with("hours", 2.0).with("sleep", 7.0).with("gender", "F");
        session.handle(Input::Request(Request::Predict { student })).unwrap();
        session.handle(Input::Random(Some(3))).unwrap();
        assert_eq!(session.pending, 0);
        assert!(session.is_idle());
    }

    #[test]
    fn test_parse_words() {
        assert_eq!(parse_input("train").unwrap(), Input::Request(Request::TrainModel));
        assert_eq!(parse_input("  status ").unwrap(), Input::Status);
        assert_eq!(parse_input("random").unwrap(), Input::Random(None));
        assert_eq!(parse_input("random 12").unwrap(), Input::Random(Some(12)));
        assert_eq!(parse_input("").unwrap(), Input::Empty);
        assert!(parse_input("dance").is_err());
        assert!(parse_input("random twelve").is_err());
    }

    #[test]
    fn test_parse_predict_payload() {
        let input = parse_input(r#"predict {"age": 20, "gender": "Male"}"#).unwrap();
        let expected = Record::new().with("age", 20.0).with("gender", "Male");
        assert_eq!(input, Input::Request(Request::Predict { student: expected }));
        assert!(parse_input("predict").is_err());
    }

    #[test]
    fn test_parse_raw_request() {
        let input = parse_input(r#"{"action": "train-model"}"#).unwrap();
        assert_eq!(input, Input::Request(Request::TrainModel));
        assert!(parse_input(r#"{"action": "fly"}"#).is_err());
    }

    #[test]
    fn test_render_events() {
        let log = WorkerEvent::TrainingLog(EpochMetrics {
            epoch: 0,
            loss: 0.5,
            mae: 0.25,
            val_loss: 0.125,
            val_mae: 0.0625,
        });
        assert_eq!(
            render_event(&log).unwrap(),
            "epoch   1 | loss=0.50000 mae=0.25000 | val_loss=0.12500 val_mae=0.06250"
        );
        assert_eq!(render_event(&WorkerEvent::ProgressUpdate { progress: 7 }).unwrap(), "[  7%]");
        assert!(render_event(&WorkerEvent::Log { message: "x".into() }).is_none());

        let rejected = WorkerEvent::PredictionRejected {
            code: ErrorCode::UnknownCategory,
            message: "unknown category 'X' for field 'gender'".into(),
        };
        assert!(render_event(&rejected).unwrap().starts_with("Prediction rejected"));
    }
}
