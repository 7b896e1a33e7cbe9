//! Worker-pool interface
//!
//! The engine never owns workers. It couples to a worker manager through
//! this contract: non-blocking polls to learn when workers are free, a
//! drain for completed query records, and dispatch entry points for single
//! queries and batches. Completions must be serialised into the drain
//! queue; the engine integrates them on its own thread of control.

mod pool;
mod synthetic;

pub use pool::TaskWorkerManager;
pub use synthetic::SyntheticWorkerManager;

use crate::caller::ExperimentCaller;
use crate::capital::CapitalType;
use crate::error::DesignerResult;
use crate::qinfo::{QInfo, WorkerId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Back-link record installed on the worker manager once at setup
#[derive(Debug, Clone)]
pub struct DesignerInfo {
    /// Composed `{asy|syn}-{policy}-{problem}` name of the driving designer
    pub full_policy_name: String,
    /// Capital accounting mode the designer runs under
    pub capital_type: CapitalType,
}

/// External contract the engine uses to dispatch and poll workers
#[async_trait]
pub trait WorkerManager: Send {
    /// Install the designer back-link. Called once at setup.
    fn register_designer(&mut self, info: DesignerInfo);

    /// The stable set of worker identities, known at setup
    fn worker_ids(&self) -> &[WorkerId];

    /// Cardinality of the worker set
    fn num_workers(&self) -> usize {
        self.worker_ids().len()
    }

    /// Non-blocking poll: when at least one worker is free, the last
    /// receive time (interpreted by the capital clock), else `None`.
    fn a_worker_is_free(&mut self) -> Option<f64>;

    /// As [`a_worker_is_free`](Self::a_worker_is_free), but only when every
    /// worker is idle.
    fn all_workers_are_free(&mut self) -> Option<f64>;

    /// Suggested sleep between polls
    fn poll_time_real(&self) -> Duration;

    /// Drain completed query records, in completion order
    fn fetch_latest_results(&mut self) -> Vec<QInfo>;

    /// Asynchronously dispatch one query to a free worker
    async fn dispatch_single_experiment(
        &mut self,
        caller: Arc<dyn ExperimentCaller>,
        qinfo: QInfo,
    ) -> DesignerResult<()>;

    /// Dispatch a batch of queries, one per free worker
    async fn dispatch_batch_of_experiments(
        &mut self,
        caller: Arc<dyn ExperimentCaller>,
        qinfos: Vec<QInfo>,
    ) -> DesignerResult<()>;

    /// Signal shutdown; no further dispatches will follow
    async fn close_all_queries(&mut self) -> DesignerResult<()>;
}
