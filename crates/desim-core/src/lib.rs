//! A deterministic discrete-event simulation kernel.
//!
//! [`SimulatorEngine`] is the entry point: schedule closures to run at a
//! future [`Time`], advance the kernel with [`SimulatorEngine::run`], and
//! the engine dispatches them in `(time, schedule order)` order. Pick a
//! [`SchedulerBackend`] to trade off insert/remove asymptotics, or plug in
//! your own via [`SchedulerBackend::External`].
//!
//! ```
//! use desim_core::{SimulatorEngine, Time};
//!
//! let engine = SimulatorEngine::new();
//! engine.schedule(Time::seconds(1.0), || println!("one second in"));
//! engine.run();
//! assert!(engine.is_finished());
//! ```

mod collector;
mod engine;
mod error;
mod event;
mod event_id;
mod high_precision;
mod log;
mod scheduler;
mod time;

#[cfg(test)]
mod scenarios;

pub use collector::EventCollector;
pub use engine::{with_default, EngineState, SimulatorEngine};
pub use error::KernelError;
pub use event_id::EventId;
pub use high_precision::HighPrecision;
pub use log::{parse_log_line, read_log, LogRecord};
pub use scheduler::{Scheduler, SchedulerBackend, SchedulerHeap, SchedulerList, SchedulerMap};
pub use time::{set_resolution, Resolution, Time};
