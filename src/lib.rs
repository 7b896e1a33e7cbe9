//! Budgeted black-box experiment design engine
//!
//! This crate provides the generic driver underneath sequential-experiment
//! policies such as Bayesian optimisation:
//! - Couples a worker pool to a pluggable query-selection policy
//! - Schedules synchronously (whole batches) or asynchronously (one query
//!   per freed worker) under a capital budget
//! - Maintains an append-only history of completed queries and the
//!   in-progress set
//! - Handles multi-fidelity metadata and failed evaluations
//!
//! Policies and problems plug in through the [`hooks`] contracts; the
//! objective plugs in through [`caller::ExperimentCaller`]; workers are
//! owned by a [`worker::WorkerManager`].

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod caller;
pub mod capital;
pub mod config;
pub mod designer;
pub mod domain;
pub mod error;
pub mod history;
pub mod hooks;
pub mod policy;
pub mod qinfo;
pub mod reporter;
pub mod worker;

pub use caller::{EvalResult, ExperimentCaller, FunctionCaller};
pub use capital::{CapitalClock, CapitalType};
pub use config::{DesignerOptions, Mode};
pub use designer::ExperimentDesigner;
pub use domain::{Domain, DomainKind, Fidel, Point};
pub use error::{DesignerError, DesignerResult};
pub use history::History;
pub use hooks::{PolicyHooks, ProblemHooks, QueryContext};
pub use policy::{OptimisationProblem, RandomSearchPolicy};
pub use qinfo::{PrevEvaluations, QInfo, QueryVal, WorkerId};
pub use reporter::{BufferReporter, NullReporter, Reporter, TracingReporter};
pub use worker::{DesignerInfo, SyntheticWorkerManager, TaskWorkerManager, WorkerManager};
