//! Hook contracts for concrete problems and policies
//!
//! The dispatch loop is generic; everything specific lives behind two
//! interface slots. The problem slot describes what is being experimented
//! on, the policy slot decides what to query next. The driver invokes the
//! hooks by contract and never reaches around them.

use crate::domain::{Domain, Fidel, Point};
use crate::error::DesignerResult;
use crate::history::History;
use crate::qinfo::{QInfo, QueryVal};

/// Read-only view of the driver's state handed to hooks that select
/// queries.
///
/// Hooks may read everything here but mutate nothing; all bookkeeping stays
/// on the driver.
pub struct QueryContext<'a> {
    /// The search space
    pub domain: &'a Domain,
    /// The fidelity space, in multi-fidelity mode
    pub fidel_space: Option<&'a Domain>,
    /// The fidelity the experiment optimises at
    pub fidel_to_opt: Option<&'a Fidel>,
    /// Completed queries so far
    pub history: &'a History,
    /// Points from caller-supplied prior evaluations
    pub prev_eval_points: &'a [Point],
    /// Values from caller-supplied prior evaluations
    pub prev_eval_vals: &'a [QueryVal],
    /// Points dispatched but not yet completed
    pub points_in_progress: &'a [Point],
    /// Next step index to be assigned
    pub step_idx: u64,
}

impl QueryContext<'_> {
    /// All evaluation data seen so far: prior evaluations first, then
    /// recorded queries, each as parallel point/value vectors.
    pub fn past_data(&self) -> (Vec<Point>, Vec<QueryVal>) {
        let mut points = self.prev_eval_points.to_vec();
        points.extend(self.history.query_points.iter().cloned());
        let mut vals = self.prev_eval_vals.to_vec();
        vals.extend(self.history.query_vals.iter().copied());
        (points, vals)
    }
}

/// Problem-side hooks: what is being experimented on
pub trait ProblemHooks: Send {
    /// One-shot initialisation after the driver's generic setup
    fn problem_set_up(&mut self) -> DesignerResult<()>;

    /// Short name composed into the full policy name
    fn problem_str(&self) -> String;

    /// Integrate caller-supplied prior evaluations
    fn problem_handle_prev_evals(&mut self, points: &[Point], vals: &[QueryVal]);

    /// Fired once before the main loop begins
    fn problem_run_experiments_initialise(&mut self) -> DesignerResult<()>;

    /// Fired for every completed query, in receive order
    fn problem_update_history(&mut self, qinfo: &QInfo);

    /// Status fragment for the progress line
    fn problem_report_results_str(&self) -> String;
}

/// Policy-side hooks: how the next query is chosen
pub trait PolicyHooks: Send {
    /// One-shot initialisation after the driver's generic setup
    fn policy_set_up(&mut self) -> DesignerResult<()>;

    /// Short name composed into the full policy name
    fn policy_str(&self) -> String;

    /// Whether this policy selects fidelities itself
    fn is_mf_policy(&self) -> bool;

    /// Fired once before the main loop begins
    fn policy_run_experiments_initialise(&mut self) -> DesignerResult<()>;

    /// Fired for every completed query, in receive order
    fn policy_update_history(&mut self, qinfo: &QInfo);

    /// Pick the next query (asynchronous path)
    fn determine_next_query(&mut self, ctx: &QueryContext<'_>) -> DesignerResult<QInfo>;

    /// Pick the next batch of queries (synchronous path)
    fn determine_next_batch_of_queries(
        &mut self,
        ctx: &QueryContext<'_>,
        batch_size: usize,
    ) -> DesignerResult<Vec<QInfo>>;

    /// Rebuild the internal model. Policies without a model keep the
    /// default no-op.
    fn build_new_model(&mut self) {}

    /// Incrementally fold freshly drained results into the model
    fn add_data_to_model(&mut self, _qinfos: &[QInfo]) {}

    /// Fallback initial-query generator, used when the caller supplied
    /// neither prior evaluations nor a generator
    fn get_initial_qinfos(&mut self, _ctx: &QueryContext<'_>, _num: usize) -> Vec<QInfo> {
        Vec::new()
    }

    /// Status fragment for the progress line
    fn policy_report_results_str(&self) -> String;

    /// Fired before every main-loop iteration
    fn main_loop_pre(&mut self) -> DesignerResult<()> {
        Ok(())
    }

    /// Fired after every main-loop iteration
    fn main_loop_post(&mut self) -> DesignerResult<()> {
        Ok(())
    }
}
