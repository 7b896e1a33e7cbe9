//! Simulated worker pool
//!
//! Evaluates queries inline at dispatch and accounts for them on a single
//! simulated timeline: each evaluation's reported duration accumulates onto
//! the pool clock, and the dispatched worker is marked free at the
//! resulting instant. Spent capital under the return-value clock therefore
//! tracks total simulated evaluation effort, which is what simulation runs
//! budget for.

use crate::caller::ExperimentCaller;
use crate::error::{DesignerError, DesignerResult};
use crate::qinfo::{QInfo, WorkerId};
use crate::worker::{DesignerInfo, WorkerManager};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// In-process pool for return-value capital runs
pub struct SyntheticWorkerManager {
    worker_ids: Vec<WorkerId>,
    /// `(worker index, last receive time)`, sorted by receive time
    worker_pipe: Vec<(usize, f64)>,
    /// Simulated timeline the evaluation durations accumulate onto
    sim_clock: f64,
    latest_results: Vec<QInfo>,
    poll_time: Duration,
}

impl SyntheticWorkerManager {
    /// Create a pool of `num_workers` simulated workers
    pub fn new(num_workers: usize) -> Self {
        Self {
            worker_ids: (0..num_workers).map(|i| format!("worker-{i}")).collect(),
            worker_pipe: (0..num_workers).map(|i| (i, 0.0)).collect(),
            sim_clock: 0.0,
            latest_results: Vec::new(),
            poll_time: Duration::ZERO,
        }
    }

    fn sort_worker_pipe(&mut self) {
        self.worker_pipe
            .sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    }

    async fn run_on_free_worker(
        &mut self,
        caller: &Arc<dyn ExperimentCaller>,
        mut qinfo: QInfo,
    ) -> DesignerResult<()> {
        if self.worker_pipe.is_empty() {
            return Err(DesignerError::Dispatch("no worker to dispatch to".to_string()));
        }
        let (widx, _) = self.worker_pipe.remove(0);
        qinfo.worker_id = Some(self.worker_ids[widx].clone());

        let res = caller.eval(&qinfo.point, qinfo.fidel.as_ref()).await;
        qinfo.val = Some(res.val);
        qinfo.true_val = res.true_val;
        qinfo.eval_time = res.eval_time;
        if qinfo.cost_at_fidel.is_none() {
            qinfo.cost_at_fidel = res.cost_at_fidel;
        }

        self.sim_clock = self.sim_clock.max(qinfo.send_time) + res.eval_time;
        self.worker_pipe.push((widx, self.sim_clock));
        self.sort_worker_pipe();
        self.latest_results.push(qinfo);
        Ok(())
    }
}

#[async_trait]
impl WorkerManager for SyntheticWorkerManager {
    fn register_designer(&mut self, info: DesignerInfo) {
        tracing::debug!(
            policy = %info.full_policy_name,
            capital_type = %info.capital_type,
            workers = self.worker_ids.len(),
            "synthetic pool registered"
        );
    }

    fn worker_ids(&self) -> &[WorkerId] {
        &self.worker_ids
    }

    fn a_worker_is_free(&mut self) -> Option<f64> {
        self.worker_pipe.first().map(|&(_, t)| t)
    }

    fn all_workers_are_free(&mut self) -> Option<f64> {
        self.worker_pipe.last().map(|&(_, t)| t)
    }

    fn poll_time_real(&self) -> Duration {
        self.poll_time
    }

    fn fetch_latest_results(&mut self) -> Vec<QInfo> {
        std::mem::take(&mut self.latest_results)
    }

    async fn dispatch_single_experiment(
        &mut self,
        caller: Arc<dyn ExperimentCaller>,
        qinfo: QInfo,
    ) -> DesignerResult<()> {
        self.run_on_free_worker(&caller, qinfo).await
    }

    async fn dispatch_batch_of_experiments(
        &mut self,
        caller: Arc<dyn ExperimentCaller>,
        qinfos: Vec<QInfo>,
    ) -> DesignerResult<()> {
        for qinfo in qinfos {
            self.run_on_free_worker(&caller, qinfo).await?;
        }
        Ok(())
    }

    async fn close_all_queries(&mut self) -> DesignerResult<()> {
        // Inline evaluation leaves nothing in flight.
        Ok(())
    }
}
