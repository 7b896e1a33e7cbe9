//! Tokio-task worker pool
//!
//! Dispatch spawns the evaluation on its own task; completed records flow
//! back over an mpsc channel and are drained non-blockingly inside the
//! polling predicates. The engine's polling contract is unchanged, the
//! channel just makes the wait cheap. Intended for realtime capital runs
//! where evaluations genuinely overlap.

use crate::caller::ExperimentCaller;
use crate::error::{DesignerError, DesignerResult};
use crate::qinfo::{QInfo, WorkerId};
use crate::worker::{DesignerInfo, WorkerManager};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Worker pool evaluating queries on spawned tokio tasks
pub struct TaskWorkerManager {
    worker_ids: Vec<WorkerId>,
    idle: Vec<WorkerId>,
    ready: Vec<QInfo>,
    results_tx: mpsc::UnboundedSender<QInfo>,
    results_rx: mpsc::UnboundedReceiver<QInfo>,
    poll_time: Duration,
    started: Instant,
    last_receive: f64,
}

impl TaskWorkerManager {
    /// Create a pool of `num_workers` task workers polling every
    /// `poll_time`
    pub fn new(num_workers: usize, poll_time: Duration) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let worker_ids: Vec<WorkerId> =
            (0..num_workers).map(|i| format!("worker-{i}")).collect();
        Self {
            idle: worker_ids.iter().rev().cloned().collect(),
            worker_ids,
            ready: Vec::new(),
            results_tx,
            results_rx,
            poll_time,
            started: Instant::now(),
            last_receive: 0.0,
        }
    }

    /// Pull every completed record out of the channel, returning its
    /// worker to the idle set.
    fn drain_completions(&mut self) {
        while let Ok(qinfo) = self.results_rx.try_recv() {
            if let Some(worker) = qinfo.worker_id.clone() {
                self.idle.push(worker);
            }
            self.last_receive = self.started.elapsed().as_secs_f64();
            self.ready.push(qinfo);
        }
    }
}

#[async_trait]
impl WorkerManager for TaskWorkerManager {
    fn register_designer(&mut self, info: DesignerInfo) {
        tracing::debug!(
            policy = %info.full_policy_name,
            capital_type = %info.capital_type,
            workers = self.worker_ids.len(),
            "task pool registered"
        );
    }

    fn worker_ids(&self) -> &[WorkerId] {
        &self.worker_ids
    }

    fn a_worker_is_free(&mut self) -> Option<f64> {
        self.drain_completions();
        (!self.idle.is_empty()).then_some(self.last_receive)
    }

    fn all_workers_are_free(&mut self) -> Option<f64> {
        self.drain_completions();
        (self.idle.len() == self.worker_ids.len()).then_some(self.last_receive)
    }

    fn poll_time_real(&self) -> Duration {
        self.poll_time
    }

    fn fetch_latest_results(&mut self) -> Vec<QInfo> {
        self.drain_completions();
        std::mem::take(&mut self.ready)
    }

    async fn dispatch_single_experiment(
        &mut self,
        caller: Arc<dyn ExperimentCaller>,
        mut qinfo: QInfo,
    ) -> DesignerResult<()> {
        self.drain_completions();
        let worker = self
            .idle
            .pop()
            .ok_or_else(|| DesignerError::Dispatch("no idle worker".to_string()))?;
        qinfo.worker_id = Some(worker);

        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let res = caller.eval(&qinfo.point, qinfo.fidel.as_ref()).await;
            qinfo.val = Some(res.val);
            qinfo.true_val = res.true_val;
            qinfo.eval_time = res.eval_time;
            if qinfo.cost_at_fidel.is_none() {
                qinfo.cost_at_fidel = res.cost_at_fidel;
            }
            // The receiver only disappears at shutdown; a late result is
            // dropped with the run.
            let _ = tx.send(qinfo);
        });
        Ok(())
    }

    async fn dispatch_batch_of_experiments(
        &mut self,
        caller: Arc<dyn ExperimentCaller>,
        qinfos: Vec<QInfo>,
    ) -> DesignerResult<()> {
        for qinfo in qinfos {
            self.dispatch_single_experiment(caller.clone(), qinfo).await?;
        }
        Ok(())
    }

    async fn close_all_queries(&mut self) -> DesignerResult<()> {
        // No per-query cancellation; in-flight evaluations run to
        // completion and are drained by the caller's wrap-up.
        Ok(())
    }
}
