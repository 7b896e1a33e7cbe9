//! Per-query metadata records
//!
//! A [`QInfo`] follows one query through its whole lifecycle: the policy
//! picks the point, the dispatch loop stamps the step index and send time,
//! the worker manager assigns a worker and fills in the evaluation result,
//! and the dispatch loop closes it out with the receive time. The record is
//! fixed; policy-specific auxiliary data belongs in policy-owned state keyed
//! by the step index.

use crate::domain::{Fidel, Point};
use serde::{Deserialize, Serialize};

/// Identity of a worker, as published by the worker manager
pub type WorkerId = String;

/// Outcome of a single evaluation.
///
/// `EvalError` is the distinguished failed-evaluation sentinel: such a query
/// is recorded in history and consumes a step, but does not count as a
/// success.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QueryVal {
    /// A successful evaluation
    Val(f64),
    /// The evaluation failed without aborting the run
    EvalError,
}

impl QueryVal {
    /// The value of a successful evaluation
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QueryVal::Val(v) => Some(*v),
            QueryVal::EvalError => None,
        }
    }

    /// Whether this is the failed-evaluation sentinel
    pub fn is_error(&self) -> bool {
        matches!(self, QueryVal::EvalError)
    }
}

/// Metadata for one query, from selection through completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QInfo {
    /// The query point, written by the policy at selection
    pub point: Point,
    /// Fidelity to evaluate at; defaulted by the dispatch loop in
    /// multi-fidelity mode when the policy leaves it unset
    pub fidel: Option<Fidel>,
    /// Step index, stamped by the dispatch loop on dispatch
    pub step_idx: u64,
    /// Capital reading when the query was sent
    pub send_time: f64,
    /// Worker that executed the query, assigned by the worker manager
    pub worker_id: Option<WorkerId>,
    /// Evaluation outcome, written on completion
    pub val: Option<QueryVal>,
    /// Noiseless value, when the caller knows it
    pub true_val: Option<f64>,
    /// Time the evaluation took, recomputed from the receive time on the
    /// driver
    pub eval_time: f64,
    /// Cost of evaluating at `fidel`; defaults to `eval_time` when absent
    pub cost_at_fidel: Option<f64>,
    /// Capital reading when the result was received
    pub receive_time: f64,
}

impl QInfo {
    /// Create a fresh query record for `point`
    pub fn new(point: Point) -> Self {
        Self {
            point,
            fidel: None,
            step_idx: 0,
            send_time: 0.0,
            worker_id: None,
            val: None,
            true_val: None,
            eval_time: 0.0,
            cost_at_fidel: None,
            receive_time: 0.0,
        }
    }

    /// Create a fresh query record for `point` at an explicit fidelity
    pub fn with_fidel(point: Point, fidel: Fidel) -> Self {
        Self {
            fidel: Some(fidel),
            ..Self::new(point)
        }
    }

    /// Whether the recorded outcome is a success
    pub fn is_successful(&self) -> bool {
        matches!(self.val, Some(QueryVal::Val(_)))
    }
}

/// Previously completed evaluations supplied by the caller.
///
/// When present, these take precedence over initial-query generation: the
/// points and values are folded into the designer's prior-data arrays and no
/// initial dispatch happens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrevEvaluations {
    /// Completed query records
    pub qinfos: Vec<QInfo>,
}

impl PrevEvaluations {
    /// Wrap a set of completed query records
    pub fn new(qinfos: Vec<QInfo>) -> Self {
        Self { qinfos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_val_classification() {
        assert_eq!(QueryVal::Val(2.5).as_f64(), Some(2.5));
        assert!(QueryVal::EvalError.is_error());
        assert!(QueryVal::EvalError.as_f64().is_none());
    }

    #[test]
    fn test_fresh_qinfo_has_no_outcome() {
        let q = QInfo::new(json!([0.5]));
        assert!(q.val.is_none());
        assert!(!q.is_successful());
        assert!(q.fidel.is_none());

        let q = QInfo::with_fidel(json!([0.5]), json!([0.9]));
        assert_eq!(q.fidel, Some(json!([0.9])));
    }
}
