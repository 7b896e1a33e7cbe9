//! Append-only experiment history
//!
//! Every completed query is recorded once, in receive order. The scalar
//! columns are parallel to each other and to `query_qinfos`; the mapping
//! from record fields to columns is a static table of copier functions
//! installed at setup, with two extra entries in multi-fidelity mode.

use crate::domain::{Fidel, Point};
use crate::qinfo::{QInfo, QueryVal, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Copies one field of a completed query record onto its history column
pub type FieldCopier = fn(&QInfo, &mut History);

/// Receive-order log of completed queries plus derived aggregates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    /// Step index of each completed query
    pub query_step_idxs: Vec<u64>,
    /// Point of each completed query
    pub query_points: Vec<Point>,
    /// Outcome of each completed query
    pub query_vals: Vec<QueryVal>,
    /// Noiseless value of each completed query, when known
    pub query_true_vals: Vec<Option<f64>>,
    /// Capital reading at dispatch
    pub query_send_times: Vec<f64>,
    /// Capital reading at completion
    pub query_receive_times: Vec<f64>,
    /// Evaluation durations
    pub query_eval_times: Vec<f64>,
    /// Worker that executed each query
    pub query_worker_ids: Vec<WorkerId>,
    /// The full records, in the same receive order
    pub query_qinfos: Vec<QInfo>,
    /// Step indices executed by each worker, in the order that worker
    /// completed them
    pub job_idxs_of_workers: HashMap<WorkerId, Vec<u64>>,
    /// Composed `{asy|syn}-{policy}-{problem}` name, set once at setup
    pub full_policy_name: String,
    /// Per-worker completed-job counts, derived at wrap-up
    pub num_jobs_per_worker: Vec<u64>,
    /// Fidelity of each completed query (multi-fidelity mode only)
    pub query_fidels: Option<Vec<Option<Fidel>>>,
    /// Cost at the evaluated fidelity (multi-fidelity mode only)
    pub query_cost_at_fidels: Option<Vec<f64>>,
}

impl History {
    /// Create an empty history for the given worker set.
    ///
    /// `multi_fidelity` switches on the fidelity columns.
    pub fn new(worker_ids: &[WorkerId], multi_fidelity: bool) -> Self {
        Self {
            job_idxs_of_workers: worker_ids
                .iter()
                .map(|w| (w.clone(), Vec::new()))
                .collect(),
            query_fidels: multi_fidelity.then(Vec::new),
            query_cost_at_fidels: multi_fidelity.then(Vec::new),
            ..Self::default()
        }
    }

    /// Number of completed evaluations recorded so far
    pub fn num_completed_evals(&self) -> usize {
        self.query_qinfos.len()
    }

    /// Whether the fidelity columns are being kept
    pub fn is_multi_fidelity(&self) -> bool {
        self.query_fidels.is_some()
    }
}

/// Field-to-column copiers shared by every run
pub(crate) fn standard_field_copiers() -> Vec<FieldCopier> {
    vec![
        |q, h| h.query_step_idxs.push(q.step_idx),
        |q, h| h.query_points.push(q.point.clone()),
        |q, h| h.query_vals.push(q.val.unwrap_or(QueryVal::EvalError)),
        |q, h| h.query_true_vals.push(q.true_val),
        |q, h| h.query_send_times.push(q.send_time),
        |q, h| h.query_receive_times.push(q.receive_time),
        |q, h| h.query_eval_times.push(q.eval_time),
        |q, h| h.query_worker_ids.push(q.worker_id.clone().unwrap_or_default()),
    ]
}

/// Extra copiers installed in multi-fidelity mode
pub(crate) fn mf_field_copiers() -> Vec<FieldCopier> {
    vec![
        |q, h| {
            if let Some(col) = h.query_fidels.as_mut() {
                col.push(q.fidel.clone());
            }
        },
        |q, h| {
            if let Some(col) = h.query_cost_at_fidels.as_mut() {
                col.push(q.cost_at_fidel.unwrap_or(q.eval_time));
            }
        },
    ]
}
