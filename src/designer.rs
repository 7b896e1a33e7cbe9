//! The dispatch and bookkeeping loop
//!
//! [`ExperimentDesigner`] couples a worker pool to a query-selection policy
//! under a capital budget. It repeatedly asks the policy for the next query
//! (or batch), forwards it to the worker manager, suspends until workers
//! free up, drains completed results into the history, and notifies the
//! policy so it can refresh its model. A single driver task owns every
//! piece of mutable state; workers only ever talk back through the manager
//! interface.

use crate::caller::ExperimentCaller;
use crate::capital::CapitalClock;
use crate::config::DesignerOptions;
use crate::domain::{Domain, Fidel, Point};
use crate::error::{DesignerError, DesignerResult};
use crate::history::{mf_field_copiers, standard_field_copiers, FieldCopier, History};
use crate::hooks::{PolicyHooks, ProblemHooks, QueryContext};
use crate::qinfo::{QInfo, QueryVal, WorkerId};
use crate::reporter::{reporter_or_default, Reporter};
use crate::worker::{DesignerInfo, WorkerManager};
use std::sync::Arc;

/// Which polling predicate a wait loops on
enum WaitTarget {
    AnyWorker,
    AllWorkers,
}

/// Builds a [`QueryContext`] from the designer's fields without borrowing
/// the hook slots, so the policy can be invoked on the result.
macro_rules! query_context {
    ($designer:expr) => {
        QueryContext {
            domain: &$designer.domain,
            fidel_space: $designer.fidel_space.as_ref(),
            fidel_to_opt: $designer.fidel_to_opt.as_ref(),
            history: &$designer.history,
            prev_eval_points: &$designer.prev_eval_points,
            prev_eval_vals: &$designer.prev_eval_vals,
            points_in_progress: &$designer.eval_points_in_progress,
            step_idx: $designer.step_idx,
        }
    };
}

/// Generic driver for budgeted black-box experiments
pub struct ExperimentDesigner {
    caller: Arc<dyn ExperimentCaller>,
    worker_manager: Box<dyn WorkerManager>,
    problem: Box<dyn ProblemHooks>,
    policy: Box<dyn PolicyHooks>,
    options: DesignerOptions,
    reporter: Box<dyn Reporter>,
    clock: CapitalClock,

    domain: Domain,
    fidel_space: Option<Domain>,
    fidel_to_opt: Option<Fidel>,
    is_mf: bool,

    available_capital: f64,
    step_idx: u64,
    num_succ_queries: u64,
    last_report_at: u64,
    last_model_build_at: u64,

    eval_idxs_in_progress: Vec<u64>,
    eval_points_in_progress: Vec<Point>,

    prev_eval_points: Vec<Point>,
    prev_eval_vals: Vec<QueryVal>,
    prev_eval_fidels: Vec<Fidel>,

    history: History,
    field_copiers: Vec<FieldCopier>,
    full_policy_name: String,
    worker_ids: Vec<WorkerId>,
    num_workers: usize,
}

impl ExperimentDesigner {
    /// Set up a designer over `caller`'s domain, driving `worker_manager`
    /// with the given problem and policy hooks.
    ///
    /// Fails when the options are invalid or when a multi-fidelity policy
    /// is paired with a caller that is not multi-fidelity.
    pub fn new(
        caller: Arc<dyn ExperimentCaller>,
        mut worker_manager: Box<dyn WorkerManager>,
        problem: Box<dyn ProblemHooks>,
        policy: Box<dyn PolicyHooks>,
        options: DesignerOptions,
        reporter: Option<Box<dyn Reporter>>,
    ) -> DesignerResult<Self> {
        options.validate()?;

        let is_mf = policy.is_mf_policy() || caller.is_mf();
        if is_mf && !caller.is_mf() {
            return Err(DesignerError::Validation(
                "a multi-fidelity policy needs a multi-fidelity experiment caller".to_string(),
            ));
        }

        let full_policy_name = format!(
            "{}-{}-{}",
            options.mode.as_str(),
            policy.policy_str(),
            problem.problem_str()
        );
        worker_manager.register_designer(DesignerInfo {
            full_policy_name: full_policy_name.clone(),
            capital_type: options.capital_type,
        });
        let worker_ids = worker_manager.worker_ids().to_vec();
        let num_workers = worker_ids.len();

        let mut history = History::new(&worker_ids, is_mf);
        history.full_policy_name = full_policy_name.clone();
        let mut field_copiers = standard_field_copiers();
        if is_mf {
            field_copiers.extend(mf_field_copiers());
        }

        let mut designer = Self {
            domain: caller.domain().clone(),
            fidel_space: caller.fidel_space().cloned(),
            fidel_to_opt: caller.fidel_to_opt().cloned(),
            is_mf,
            clock: CapitalClock::new(options.capital_type),
            reporter: reporter_or_default(reporter),
            available_capital: 0.0,
            step_idx: 0,
            num_succ_queries: 0,
            last_report_at: 0,
            last_model_build_at: 0,
            eval_idxs_in_progress: Vec::new(),
            eval_points_in_progress: Vec::new(),
            prev_eval_points: Vec::new(),
            prev_eval_vals: Vec::new(),
            prev_eval_fidels: Vec::new(),
            history,
            field_copiers,
            full_policy_name,
            worker_ids,
            num_workers,
            caller,
            worker_manager,
            problem,
            policy,
            options,
        };
        designer.problem.problem_set_up()?;
        designer.policy.policy_set_up()?;
        Ok(designer)
    }

    // Accessors ------------------------------------------------------------

    /// Completed queries recorded so far
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Next step index to be assigned
    pub fn step_idx(&self) -> u64 {
        self.step_idx
    }

    /// Completed queries whose value was not the failure sentinel
    pub fn num_succ_queries(&self) -> u64 {
        self.num_succ_queries
    }

    /// Number of completed evaluations
    pub fn num_completed_evals(&self) -> usize {
        self.history.num_completed_evals()
    }

    /// Capital made available so far
    pub fn available_capital(&self) -> f64 {
        self.available_capital
    }

    /// Capital spent so far, per the configured clock
    pub fn spent_capital(&self) -> f64 {
        self.clock.spent()
    }

    /// Composed `{asy|syn}-{policy}-{problem}` name
    pub fn full_policy_name(&self) -> &str {
        &self.full_policy_name
    }

    /// Step indices of queries dispatched but not yet completed
    pub fn eval_idxs_in_progress(&self) -> &[u64] {
        &self.eval_idxs_in_progress
    }

    /// Points of queries dispatched but not yet completed
    pub fn eval_points_in_progress(&self) -> &[Point] {
        &self.eval_points_in_progress
    }

    /// Fidelities of caller-supplied prior evaluations
    pub fn prev_eval_fidels(&self) -> &[Fidel] {
        &self.prev_eval_fidels
    }

    /// All evaluation data seen so far: prior evaluations first, then
    /// recorded queries.
    pub fn get_past_data(&self) -> (Vec<Point>, Vec<QueryVal>) {
        query_context!(self).past_data()
    }

    /// Make `capital` available to the run
    pub fn add_capital(&mut self, capital: f64) {
        self.available_capital += capital;
    }

    // Bookkeeping ----------------------------------------------------------

    /// Record one completed query: append it and every mapped field to the
    /// history, credit its worker, fire the per-completion hooks, and count
    /// it as a success unless its value is the failure sentinel.
    fn record(&mut self, qinfo: &QInfo) -> DesignerResult<()> {
        let worker = qinfo.worker_id.clone().ok_or_else(|| {
            DesignerError::Internal(format!(
                "completed query at step {} has no worker id",
                qinfo.step_idx
            ))
        })?;
        self.history
            .job_idxs_of_workers
            .entry(worker)
            .or_default()
            .push(qinfo.step_idx);
        self.history.query_qinfos.push(qinfo.clone());
        for copy in &self.field_copiers {
            copy(qinfo, &mut self.history);
        }
        self.problem.problem_update_history(qinfo);
        self.policy.policy_update_history(qinfo);
        if qinfo.is_successful() {
            self.num_succ_queries += 1;
        }
        Ok(())
    }

    /// Stamp receive times onto a drained batch and recompute evaluation
    /// times, rejecting any negative result. Returns the maximum receive
    /// time across the batch, the loop's observable advance.
    fn update_capital(&mut self, qinfos: &mut [QInfo]) -> DesignerResult<Option<f64>> {
        let mut max_receive: Option<f64> = None;
        for qinfo in qinfos.iter_mut() {
            let receive = self.clock.receive_time_for(qinfo.send_time, qinfo.eval_time);
            qinfo.receive_time = receive;
            qinfo.eval_time = receive - qinfo.send_time;
            if qinfo.eval_time < 0.0 {
                return Err(DesignerError::InvalidTiming {
                    send: qinfo.send_time,
                    receive,
                    eval: qinfo.eval_time,
                });
            }
            max_receive = Some(max_receive.map_or(receive, |m| m.max(receive)));
        }
        Ok(max_receive)
    }

    fn add_to_in_progress(&mut self, entries: Vec<(u64, Point)>) -> DesignerResult<()> {
        for (step, point) in entries {
            if self.eval_idxs_in_progress.contains(&step) {
                return Err(DesignerError::DuplicateStepInProgress(step));
            }
            self.eval_idxs_in_progress.push(step);
            self.eval_points_in_progress.push(point);
        }
        debug_assert!(self.eval_idxs_in_progress.len() <= self.num_workers.max(1));
        Ok(())
    }

    fn remove_from_in_progress(&mut self, qinfo: &QInfo) -> DesignerResult<()> {
        let mut found = None;
        for (i, &step) in self.eval_idxs_in_progress.iter().enumerate() {
            if step == qinfo.step_idx {
                if found.is_some() {
                    return Err(DesignerError::DuplicateStepInProgress(step));
                }
                found = Some(i);
            }
        }
        let idx = found.ok_or(DesignerError::StepNotInProgress(qinfo.step_idx))?;
        self.eval_idxs_in_progress.remove(idx);
        self.eval_points_in_progress.remove(idx);
        Ok(())
    }

    // Waiting and dispatch -------------------------------------------------

    /// Poll until the target predicate reports free workers, integrating
    /// any completed results along the way.
    async fn wait_till_free(&mut self, target: WaitTarget) -> DesignerResult<()> {
        loop {
            let free_at = match target {
                WaitTarget::AnyWorker => self.worker_manager.a_worker_is_free(),
                WaitTarget::AllWorkers => self.worker_manager.all_workers_are_free(),
            };
            if let Some(last_receive) = free_at {
                self.clock.set_spent(last_receive);
                let mut results = self.worker_manager.fetch_latest_results();
                if let Some(max_receive) = self.update_capital(&mut results)? {
                    tracing::trace!(
                        drained = results.len(),
                        max_receive,
                        "integrating completed queries"
                    );
                }
                for qinfo in &mut results {
                    if self.is_mf && qinfo.cost_at_fidel.is_none() {
                        qinfo.cost_at_fidel = Some(qinfo.eval_time);
                    }
                }
                for qinfo in &results {
                    self.record(qinfo)?;
                    self.remove_from_in_progress(qinfo)?;
                }
                self.policy.add_data_to_model(&results);
                return Ok(());
            }
            tokio::time::sleep(self.worker_manager.poll_time_real()).await;
        }
    }

    async fn wait_for_a_free_worker(&mut self) -> DesignerResult<()> {
        self.wait_till_free(WaitTarget::AnyWorker).await
    }

    async fn wait_for_all_free_workers(&mut self) -> DesignerResult<()> {
        self.wait_till_free(WaitTarget::AllWorkers).await
    }

    /// Stamp send time and step index onto `qinfo` and hand it to the
    /// worker manager.
    async fn dispatch_single_experiment(&mut self, mut qinfo: QInfo) -> DesignerResult<()> {
        qinfo.send_time = self.clock.spent();
        qinfo.step_idx = self.step_idx;
        let entry = (qinfo.step_idx, qinfo.point.clone());
        self.worker_manager
            .dispatch_single_experiment(Arc::clone(&self.caller), qinfo)
            .await?;
        self.add_to_in_progress(vec![entry])
    }

    /// Stamp send time and monotonically increasing step indices onto a
    /// batch and hand it to the worker manager.
    async fn dispatch_batch_of_experiments(
        &mut self,
        mut qinfos: Vec<QInfo>,
    ) -> DesignerResult<()> {
        let send_time = self.clock.spent();
        let mut entries = Vec::with_capacity(qinfos.len());
        for (offset, qinfo) in qinfos.iter_mut().enumerate() {
            qinfo.send_time = send_time;
            qinfo.step_idx = self.step_idx + offset as u64;
            entries.push((qinfo.step_idx, qinfo.point.clone()));
        }
        self.worker_manager
            .dispatch_batch_of_experiments(Arc::clone(&self.caller), qinfos)
            .await?;
        self.add_to_in_progress(entries)
    }

    // Initialisation -------------------------------------------------------

    /// Seed the run with data: prior evaluations when supplied, otherwise
    /// dispatched initial queries.
    async fn perform_initial_queries(&mut self) -> DesignerResult<()> {
        if let Some(prev) = self.options.prev_evaluations.clone() {
            for qinfo in &prev.qinfos {
                self.prev_eval_points.push(qinfo.point.clone());
                self.prev_eval_vals
                    .push(qinfo.val.unwrap_or(QueryVal::EvalError));
                if let Some(fidel) = &qinfo.fidel {
                    if self.is_mf {
                        self.prev_eval_fidels.push(fidel.clone());
                    }
                }
            }
            self.problem
                .problem_handle_prev_evals(&self.prev_eval_points, &self.prev_eval_vals);
            return Ok(());
        }

        if self.options.num_init_evals <= 0 {
            return Ok(());
        }
        let num_init_evals = (self.options.num_init_evals as usize).max(self.num_workers);
        let init_qinfos = match self.options.get_initial_qinfos.clone() {
            Some(generate) => generate(num_init_evals),
            None => {
                let ctx = query_context!(self);
                self.policy.get_initial_qinfos(&ctx, num_init_evals)
            }
        };
        for qinfo in init_qinfos {
            self.wait_for_a_free_worker().await?;
            self.dispatch_single_experiment(qinfo).await?;
            self.step_idx += 1;
        }
        Ok(())
    }

    /// Init the capital clock, seed the run, and fire the one-shot child
    /// hooks.
    async fn run_experiment_initialise(&mut self) -> DesignerResult<()> {
        self.clock.init()?;
        self.perform_initial_queries().await?;
        self.problem.problem_run_experiments_initialise()?;
        self.policy.policy_run_experiments_initialise()?;
        Ok(())
    }

    // Main loop ------------------------------------------------------------

    fn terminate_now(&mut self) -> bool {
        if self.step_idx >= self.options.max_num_steps {
            self.reporter.writeln(&format!(
                "Exceeded {} evaluations. Terminating now!",
                self.options.max_num_steps
            ));
            return true;
        }
        self.clock.spent() >= self.available_capital
    }

    async fn asynchronous_routine(&mut self) -> DesignerResult<()> {
        self.wait_for_a_free_worker().await?;
        let mut qinfo = {
            let ctx = query_context!(self);
            self.policy.determine_next_query(&ctx)?
        };
        if self.is_mf && qinfo.fidel.is_none() {
            qinfo.fidel = self.fidel_to_opt.clone();
        }
        self.dispatch_single_experiment(qinfo).await?;
        self.step_idx += 1;
        Ok(())
    }

    async fn synchronous_routine(&mut self) -> DesignerResult<()> {
        self.wait_for_all_free_workers().await?;
        let qinfos = {
            let ctx = query_context!(self);
            self.policy
                .determine_next_batch_of_queries(&ctx, self.num_workers)?
        };
        let batch_size = qinfos.len() as u64;
        self.dispatch_batch_of_experiments(qinfos).await?;
        self.step_idx += batch_size;
        Ok(())
    }

    fn build_new_model(&mut self) {
        self.last_model_build_at = self.step_idx;
        self.policy.build_new_model();
    }

    // Reporting ------------------------------------------------------------

    fn jobs_for_each_worker_str(&self) -> String {
        let jobs_each_worker: Vec<usize> = self
            .worker_ids
            .iter()
            .map(|w| {
                self.history
                    .job_idxs_of_workers
                    .get(w)
                    .map_or(0, Vec::len)
            })
            .collect();
        if self.num_workers <= 5 {
            format!("{jobs_each_worker:?}")
        } else {
            let min = jobs_each_worker.iter().min().copied().unwrap_or(0);
            let max = jobs_each_worker.iter().max().copied().unwrap_or(0);
            format!("[min:{min}, max:{max}]")
        }
    }

    fn curr_job_idxs_in_progress_str(&self) -> String {
        if self.num_workers <= 4 {
            format!("{:?}", self.eval_idxs_in_progress)
        } else {
            let total = self.eval_idxs_in_progress.len();
            let min = self
                .eval_idxs_in_progress
                .iter()
                .min()
                .map_or(-1, |&v| v as i64);
            let max = self
                .eval_idxs_in_progress
                .iter()
                .max()
                .map_or(-1, |&v| v as i64);
            let dif = if total == 0 { -1 } else { max - min };
            format!("[min:{min}, max:{max}, dif:{dif}, tot:{total}]")
        }
    }

    /// Emit one progress line through the reporter
    fn report_curr_results(&mut self) {
        let cap_frac = if self.available_capital <= 0.0 {
            f64::NAN
        } else {
            self.clock.spent() / self.available_capital
        };
        let line = format!(
            "{} ({:03}/{:03}) cap: {:.3}:: {} {} w={}, inP={}",
            self.full_policy_name,
            self.num_succ_queries,
            self.step_idx,
            cap_frac,
            self.problem.problem_report_results_str(),
            self.policy.policy_report_results_str(),
            self.jobs_for_each_worker_str(),
            self.curr_job_idxs_in_progress_str(),
        );
        self.reporter.writeln(&line);
        self.last_report_at = self.step_idx;
    }

    // Wrap-up --------------------------------------------------------------

    /// Shut the workers down, drain the last results, report, and derive
    /// the per-worker job counts.
    async fn run_experiment_wrap_up(&mut self) -> DesignerResult<()> {
        self.worker_manager.close_all_queries().await?;
        self.wait_for_all_free_workers().await?;
        self.report_curr_results();
        let num_jobs_per_worker: Vec<u64> = self
            .worker_ids
            .iter()
            .map(|w| {
                self.history
                    .job_idxs_of_workers
                    .get(w)
                    .map_or(0, |v| v.len() as u64)
            })
            .collect();
        self.history.num_jobs_per_worker = num_jobs_per_worker;
        Ok(())
    }

    /// The quantities handed back when a run finishes
    pub fn get_final_return_quantities(&self) -> History {
        self.history.clone()
    }

    /// Run experiments until the capital or step budget is exhausted and
    /// return the history.
    pub async fn run_experiments(&mut self, max_capital: f64) -> DesignerResult<History> {
        self.add_capital(max_capital);
        self.run_experiment_initialise().await?;

        while !self.terminate_now() {
            self.policy.main_loop_pre()?;
            if self.options.mode.is_asynchronous() {
                self.asynchronous_routine().await?;
            } else {
                self.synchronous_routine().await?;
            }
            if self.step_idx - self.last_model_build_at >= self.options.build_new_model_every {
                self.build_new_model();
            }
            if self.step_idx - self.last_report_at >= self.options.report_results_every {
                self.report_curr_results();
            }
            self.policy.main_loop_post()?;
        }

        self.run_experiment_wrap_up().await?;
        Ok(self.get_final_return_quantities())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::FunctionCaller;
    use crate::config::Mode;
    use crate::policy::{OptimisationProblem, RandomSearchPolicy};
    use crate::reporter::BufferReporter;
    use crate::worker::SyntheticWorkerManager;
    use serde_json::json;

    fn make_designer(options: DesignerOptions) -> (ExperimentDesigner, BufferReporter) {
        let domain = Domain::euclidean(vec![(0.0, 1.0)]).unwrap();
        let caller = Arc::new(FunctionCaller::new(domain, |p, _| {
            QueryVal::Val(1.0 - p[0].as_f64().unwrap_or(0.0))
        }));
        let reporter = BufferReporter::new();
        let designer = ExperimentDesigner::new(
            caller,
            Box::new(SyntheticWorkerManager::new(2)),
            Box::new(OptimisationProblem::new()),
            Box::new(RandomSearchPolicy::new(42)),
            options,
            Some(Box::new(reporter.clone())),
        )
        .unwrap();
        (designer, reporter)
    }

    #[test]
    fn test_full_policy_name_carries_mode_prefix() {
        let (designer, _) = make_designer(DesignerOptions::default());
        assert!(designer.full_policy_name().starts_with("asy-"));

        let (designer, _) = make_designer(DesignerOptions {
            mode: Mode::Syn,
            ..DesignerOptions::default()
        });
        assert!(designer.full_policy_name().starts_with("syn-"));
        assert_eq!(designer.history().full_policy_name, designer.full_policy_name());
    }

    #[test]
    fn test_update_capital_rejects_negative_eval_time() {
        let (mut designer, _) = make_designer(DesignerOptions::default());
        let mut bad = QInfo::new(json!([0.5]));
        bad.send_time = 5.0;
        bad.eval_time = -2.0;
        let err = designer.update_capital(std::slice::from_mut(&mut bad));
        assert!(matches!(err, Err(DesignerError::InvalidTiming { .. })));
    }

    #[test]
    fn test_update_capital_returns_max_receive_time() {
        let (mut designer, _) = make_designer(DesignerOptions::default());
        let mut batch = vec![QInfo::new(json!([0.1])), QInfo::new(json!([0.2]))];
        batch[0].send_time = 0.0;
        batch[0].eval_time = 3.0;
        batch[1].send_time = 1.0;
        batch[1].eval_time = 1.0;
        let max = designer.update_capital(&mut batch).unwrap();
        assert_eq!(max, Some(3.0));
        assert_eq!(batch[0].receive_time, 3.0);
        assert_eq!(batch[1].receive_time, 2.0);
    }

    #[test]
    fn test_in_progress_removal_fails_loudly() {
        let (mut designer, _) = make_designer(DesignerOptions::default());
        designer
            .add_to_in_progress(vec![(3, json!([0.1]))])
            .unwrap();

        let mut unknown = QInfo::new(json!([0.9]));
        unknown.step_idx = 9;
        assert!(matches!(
            designer.remove_from_in_progress(&unknown),
            Err(DesignerError::StepNotInProgress(9))
        ));

        assert!(matches!(
            designer.add_to_in_progress(vec![(3, json!([0.2]))]),
            Err(DesignerError::DuplicateStepInProgress(3))
        ));

        let mut known = QInfo::new(json!([0.1]));
        known.step_idx = 3;
        designer.remove_from_in_progress(&known).unwrap();
        assert!(designer.eval_idxs_in_progress().is_empty());
    }

    #[test]
    fn test_mf_policy_requires_mf_caller() {
        struct MfPolicy(RandomSearchPolicy);
        impl PolicyHooks for MfPolicy {
            fn policy_set_up(&mut self) -> DesignerResult<()> {
                self.0.policy_set_up()
            }
            fn policy_str(&self) -> String {
                self.0.policy_str()
            }
            fn is_mf_policy(&self) -> bool {
                true
            }
            fn policy_run_experiments_initialise(&mut self) -> DesignerResult<()> {
                Ok(())
            }
            fn policy_update_history(&mut self, _qinfo: &QInfo) {}
            fn determine_next_query(&mut self, ctx: &QueryContext<'_>) -> DesignerResult<QInfo> {
                self.0.determine_next_query(ctx)
            }
            fn determine_next_batch_of_queries(
                &mut self,
                ctx: &QueryContext<'_>,
                batch_size: usize,
            ) -> DesignerResult<Vec<QInfo>> {
                self.0.determine_next_batch_of_queries(ctx, batch_size)
            }
            fn policy_report_results_str(&self) -> String {
                String::new()
            }
        }

        let domain = Domain::euclidean(vec![(0.0, 1.0)]).unwrap();
        let caller = Arc::new(FunctionCaller::new(domain, |_, _| QueryVal::Val(0.0)));
        let result = ExperimentDesigner::new(
            caller,
            Box::new(SyntheticWorkerManager::new(1)),
            Box::new(OptimisationProblem::new()),
            Box::new(MfPolicy(RandomSearchPolicy::new(7))),
            DesignerOptions::default(),
            None,
        );
        assert!(matches!(result, Err(DesignerError::Validation(_))));
    }

    #[test]
    fn test_report_line_shape() {
        let (mut designer, reporter) = make_designer(DesignerOptions::default());
        designer.add_capital(10.0);
        designer.report_curr_results();
        let lines = reporter.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("asy-rand-opt (000/000) cap: 0.000:: "));
        assert!(lines[0].contains("w=[0, 0],"));
        assert!(lines[0].contains("inP=[]"));
    }

    #[test]
    fn test_report_nan_capital_fraction_without_capital() {
        let (mut designer, reporter) = make_designer(DesignerOptions::default());
        designer.report_curr_results();
        assert!(reporter.lines()[0].contains("cap: NaN:: "));
    }
}
