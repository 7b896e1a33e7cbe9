//! Experiment caller contract
//!
//! The experiment caller owns the objective being probed: it knows the
//! domain, optionally a fidelity space, and how to evaluate a point. The
//! engine never looks inside an evaluation; the worker manager applies it
//! and hands back the outcome.

use crate::domain::{Domain, Fidel, Point};
use crate::qinfo::QueryVal;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of evaluating one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    /// Observed value, or the failed-evaluation sentinel
    pub val: QueryVal,
    /// Noiseless value, when the caller knows it
    pub true_val: Option<f64>,
    /// Time the evaluation took, in capital units
    pub eval_time: f64,
    /// Cost of evaluating at the requested fidelity, when it differs from
    /// the evaluation time
    pub cost_at_fidel: Option<f64>,
}

impl EvalResult {
    /// A successful evaluation that took `eval_time`
    pub fn new(val: f64, eval_time: f64) -> Self {
        Self {
            val: QueryVal::Val(val),
            true_val: None,
            eval_time,
            cost_at_fidel: None,
        }
    }

    /// A failed evaluation that still consumed `eval_time`
    pub fn error(eval_time: f64) -> Self {
        Self {
            val: QueryVal::EvalError,
            true_val: None,
            eval_time,
            cost_at_fidel: None,
        }
    }
}

/// The objective under study, as consumed by the engine
#[async_trait]
pub trait ExperimentCaller: Send + Sync {
    /// The search space queries are drawn from
    fn domain(&self) -> &Domain;

    /// The fidelity space, in multi-fidelity mode
    fn fidel_space(&self) -> Option<&Domain> {
        None
    }

    /// The fidelity the experiment ultimately optimises at
    fn fidel_to_opt(&self) -> Option<&Fidel> {
        None
    }

    /// Whether this caller evaluates at multiple fidelities
    fn is_mf(&self) -> bool {
        self.fidel_space().is_some()
    }

    /// Evaluate `point`, optionally at `fidel`.
    ///
    /// Failures surface as [`QueryVal::EvalError`] in the result rather
    /// than aborting the run.
    async fn eval(&self, point: &Point, fidel: Option<&Fidel>) -> EvalResult;
}

/// Objective function used by [`FunctionCaller`]
pub type ObjectiveFn = dyn Fn(&Point, Option<&Fidel>) -> QueryVal + Send + Sync;

/// An experiment caller wrapping a plain function.
///
/// Reports a fixed evaluation time, which makes it the natural caller for
/// simulated (return-value capital) runs.
pub struct FunctionCaller {
    domain: Domain,
    func: Arc<ObjectiveFn>,
    eval_time: f64,
    fidel_space: Option<Domain>,
    fidel_to_opt: Option<Fidel>,
}

impl FunctionCaller {
    /// Wrap `func` over `domain` with a unit evaluation time
    pub fn new<F>(domain: Domain, func: F) -> Self
    where
        F: Fn(&Point, Option<&Fidel>) -> QueryVal + Send + Sync + 'static,
    {
        Self {
            domain,
            func: Arc::new(func),
            eval_time: 1.0,
            fidel_space: None,
            fidel_to_opt: None,
        }
    }

    /// Report `eval_time` for every evaluation
    pub fn with_eval_time(mut self, eval_time: f64) -> Self {
        self.eval_time = eval_time;
        self
    }

    /// Declare a fidelity space and the fidelity to optimise at
    pub fn with_fidelity(mut self, fidel_space: Domain, fidel_to_opt: Fidel) -> Self {
        self.fidel_space = Some(fidel_space);
        self.fidel_to_opt = Some(fidel_to_opt);
        self
    }
}

#[async_trait]
impl ExperimentCaller for FunctionCaller {
    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn fidel_space(&self) -> Option<&Domain> {
        self.fidel_space.as_ref()
    }

    fn fidel_to_opt(&self) -> Option<&Fidel> {
        self.fidel_to_opt.as_ref()
    }

    async fn eval(&self, point: &Point, fidel: Option<&Fidel>) -> EvalResult {
        EvalResult {
            val: (self.func)(point, fidel),
            true_val: None,
            eval_time: self.eval_time,
            cost_at_fidel: None,
        }
    }
}
