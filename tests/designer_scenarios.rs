//! End-to-end runs of the dispatch loop over the in-process worker pools

use blackbird::{
    BufferReporter, DesignerOptions, DesignerResult, Domain, ExperimentDesigner,
    FunctionCaller, History, Mode, OptimisationProblem, PolicyHooks, Point, PrevEvaluations,
    QInfo, QueryContext, QueryVal, RandomSearchPolicy, SyntheticWorkerManager,
    TaskWorkerManager, WorkerManager,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Policy that proposes the same point forever
struct ConstantPolicy {
    point: Point,
}

impl ConstantPolicy {
    fn new(point: Point) -> Self {
        Self { point }
    }
}

impl PolicyHooks for ConstantPolicy {
    fn policy_set_up(&mut self) -> DesignerResult<()> {
        Ok(())
    }

    fn policy_str(&self) -> String {
        "const".to_string()
    }

    fn is_mf_policy(&self) -> bool {
        false
    }

    fn policy_run_experiments_initialise(&mut self) -> DesignerResult<()> {
        Ok(())
    }

    fn policy_update_history(&mut self, _qinfo: &QInfo) {}

    fn determine_next_query(&mut self, _ctx: &QueryContext<'_>) -> DesignerResult<QInfo> {
        Ok(QInfo::new(self.point.clone()))
    }

    fn determine_next_batch_of_queries(
        &mut self,
        _ctx: &QueryContext<'_>,
        batch_size: usize,
    ) -> DesignerResult<Vec<QInfo>> {
        Ok((0..batch_size)
            .map(|_| QInfo::new(self.point.clone()))
            .collect())
    }

    fn get_initial_qinfos(&mut self, _ctx: &QueryContext<'_>, num: usize) -> Vec<QInfo> {
        (0..num).map(|_| QInfo::new(self.point.clone())).collect()
    }

    fn policy_report_results_str(&self) -> String {
        String::new()
    }
}

fn unit_domain() -> Domain {
    Domain::euclidean(vec![(0.0, 1.0)]).unwrap()
}

fn assert_core_invariants(history: &History) {
    for qinfo in &history.query_qinfos {
        assert!(qinfo.receive_time >= qinfo.send_time);
        assert!((qinfo.eval_time - (qinfo.receive_time - qinfo.send_time)).abs() < 1e-9);
    }
    let succ = history
        .query_vals
        .iter()
        .filter(|v| !v.is_error())
        .count();
    assert_eq!(
        history.query_vals.len(),
        history.num_completed_evals(),
        "value column parallel to records"
    );
    let jobs_total: usize = history.job_idxs_of_workers.values().map(Vec::len).sum();
    assert_eq!(jobs_total, history.num_completed_evals());
    assert_eq!(
        history.num_jobs_per_worker.iter().sum::<u64>() as usize,
        history.num_completed_evals()
    );
    assert!(succ <= history.num_completed_evals());
}

#[tokio::test]
async fn test_async_return_value_run_exhausts_step_budget() {
    let caller = Arc::new(FunctionCaller::new(unit_domain(), |_, _| {
        QueryVal::Val(3.5)
    }));
    let options = DesignerOptions {
        max_num_steps: 10,
        num_init_evals: 2,
        ..DesignerOptions::default()
    };
    let reporter = BufferReporter::new();
    let mut designer = ExperimentDesigner::new(
        caller,
        Box::new(SyntheticWorkerManager::new(2)),
        Box::new(OptimisationProblem::new()),
        Box::new(ConstantPolicy::new(json!([0.5]))),
        options,
        Some(Box::new(reporter.clone())),
    )
    .unwrap();

    let history = designer.run_experiments(1e6).await.unwrap();

    assert_eq!(designer.step_idx(), 10);
    assert_eq!(designer.num_succ_queries(), 10);
    assert_eq!(history.query_vals.len(), 10);
    // Each unit-time evaluation consumed one unit of simulated capital.
    assert_eq!(designer.spent_capital(), 10.0);
    assert!(designer.eval_idxs_in_progress().is_empty());
    assert!(designer.full_policy_name().starts_with("asy-"));
    assert_core_invariants(&history);
    assert!(reporter
        .lines()
        .iter()
        .any(|l| l.contains("Exceeded 10 evaluations")));
}

#[tokio::test]
async fn test_sync_run_dispatches_full_batches() {
    let caller = Arc::new(FunctionCaller::new(unit_domain(), |_, _| {
        QueryVal::Val(1.0)
    }));
    let options = DesignerOptions {
        mode: Mode::Syn,
        max_num_steps: 12,
        num_init_evals: 0,
        ..DesignerOptions::default()
    };
    let mut designer = ExperimentDesigner::new(
        caller,
        Box::new(SyntheticWorkerManager::new(4)),
        Box::new(OptimisationProblem::new()),
        Box::new(ConstantPolicy::new(json!([0.25]))),
        options,
        Some(Box::new(BufferReporter::new())),
    )
    .unwrap();

    let history = designer.run_experiments(1e6).await.unwrap();

    assert_eq!(designer.step_idx(), 12);
    assert_eq!(history.num_completed_evals(), 12);
    assert!(designer.full_policy_name().starts_with("syn-"));

    // Step indices are strictly increasing within each batch of four.
    let mut steps = history.query_step_idxs.clone();
    steps.sort_unstable();
    assert_eq!(steps, (0..12).collect::<Vec<_>>());

    // All four queries of a batch share their send time: 0, 4 and 8.
    let mut sends = history.query_send_times.clone();
    sends.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(
        sends,
        vec![0.0, 0.0, 0.0, 0.0, 4.0, 4.0, 4.0, 4.0, 8.0, 8.0, 8.0, 8.0]
    );
    assert_core_invariants(&history);
}

#[tokio::test]
async fn test_eval_error_is_recorded_but_not_counted_successful() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_caller = Arc::clone(&calls);
    let caller = Arc::new(FunctionCaller::new(unit_domain(), move |_, _| {
        if calls_in_caller.fetch_add(1, Ordering::SeqCst) == 3 {
            QueryVal::EvalError
        } else {
            QueryVal::Val(2.0)
        }
    }));
    let options = DesignerOptions {
        max_num_steps: 10,
        num_init_evals: 2,
        ..DesignerOptions::default()
    };
    let mut designer = ExperimentDesigner::new(
        caller,
        Box::new(SyntheticWorkerManager::new(2)),
        Box::new(OptimisationProblem::new()),
        Box::new(ConstantPolicy::new(json!([0.5]))),
        options,
        Some(Box::new(BufferReporter::new())),
    )
    .unwrap();

    let history = designer.run_experiments(1e6).await.unwrap();

    assert_eq!(history.num_completed_evals(), 10);
    assert_eq!(designer.num_succ_queries(), 9);
    let failures = history.query_vals.iter().filter(|v| v.is_error()).count();
    assert_eq!(failures, 1);
    assert_core_invariants(&history);
}

#[tokio::test]
async fn test_mf_defaults_fidelity_and_cost() {
    let fidel_to_opt = json!([1.0]);
    let caller = Arc::new(
        FunctionCaller::new(unit_domain(), |_, _| QueryVal::Val(0.0)).with_fidelity(
            Domain::euclidean(vec![(0.0, 1.0)]).unwrap(),
            fidel_to_opt.clone(),
        ),
    );
    let options = DesignerOptions {
        max_num_steps: 4,
        num_init_evals: 0,
        ..DesignerOptions::default()
    };
    let mut designer = ExperimentDesigner::new(
        caller,
        Box::new(SyntheticWorkerManager::new(1)),
        Box::new(OptimisationProblem::new()),
        Box::new(ConstantPolicy::new(json!([0.5]))),
        options,
        Some(Box::new(BufferReporter::new())),
    )
    .unwrap();

    let history = designer.run_experiments(1e6).await.unwrap();

    assert!(history.is_multi_fidelity());
    let fidels = history.query_fidels.as_ref().unwrap();
    assert_eq!(fidels.len(), 4);
    assert!(fidels.iter().all(|f| f.as_ref() == Some(&fidel_to_opt)));

    // No cost was reported, so each entry defaults to the evaluation time.
    let costs = history.query_cost_at_fidels.as_ref().unwrap();
    assert_eq!(costs, &history.query_eval_times);
    assert_core_invariants(&history);
}

#[tokio::test]
async fn test_capital_exhaustion_terminates_the_run() {
    let caller = Arc::new(FunctionCaller::new(unit_domain(), |_, _| {
        QueryVal::Val(1.0)
    }));
    let options = DesignerOptions {
        num_init_evals: 1,
        ..DesignerOptions::default()
    };
    let mut designer = ExperimentDesigner::new(
        caller,
        Box::new(SyntheticWorkerManager::new(1)),
        Box::new(OptimisationProblem::new()),
        Box::new(ConstantPolicy::new(json!([0.5]))),
        options,
        Some(Box::new(BufferReporter::new())),
    )
    .unwrap();

    let history = designer.run_experiments(5.0).await.unwrap();

    // The loop stops at the first check after spent capital reaches 5; the
    // query dispatched in that final iteration still completes and is
    // drained at wrap-up.
    assert!(designer.spent_capital() >= 5.0);
    assert_eq!(designer.step_idx(), 6);
    assert_eq!(history.num_completed_evals() as u64, designer.step_idx());
    assert_eq!(
        history.query_receive_times,
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
    );
    assert!(designer.eval_idxs_in_progress().is_empty());
    assert_core_invariants(&history);
}

#[tokio::test]
async fn test_prev_evaluations_replace_initial_dispatch() {
    let caller = Arc::new(FunctionCaller::new(unit_domain(), |_, _| {
        QueryVal::Val(0.5)
    }));
    let prev = PrevEvaluations::new(
        (0..3)
            .map(|i| {
                let mut q = QInfo::new(json!([0.1 * i as f64]));
                q.val = Some(QueryVal::Val(i as f64));
                q
            })
            .collect(),
    );
    let options = DesignerOptions {
        max_num_steps: 4,
        num_init_evals: 20,
        prev_evaluations: Some(prev),
        ..DesignerOptions::default()
    };
    let mut designer = ExperimentDesigner::new(
        caller,
        Box::new(SyntheticWorkerManager::new(2)),
        Box::new(OptimisationProblem::new()),
        Box::new(RandomSearchPolicy::new(5)),
        options,
        Some(Box::new(BufferReporter::new())),
    )
    .unwrap();

    let history = designer.run_experiments(1e6).await.unwrap();

    // No initial queries were generated; only the main loop dispatched.
    assert_eq!(history.num_completed_evals(), 4);
    let (points, vals) = designer.get_past_data();
    assert_eq!(points.len(), 3 + 4);
    assert_eq!(vals[0], QueryVal::Val(0.0));
    assert_eq!(vals[2], QueryVal::Val(2.0));
    assert_core_invariants(&history);
}

#[tokio::test]
async fn test_caller_supplied_initial_generator_takes_precedence() {
    let caller = Arc::new(FunctionCaller::new(unit_domain(), |_, _| {
        QueryVal::Val(0.5)
    }));
    let options = DesignerOptions {
        max_num_steps: 3,
        num_init_evals: 3,
        get_initial_qinfos: Some(Arc::new(|num| {
            (0..num).map(|_| QInfo::new(json!([0.125]))).collect()
        })),
        ..DesignerOptions::default()
    };
    let mut designer = ExperimentDesigner::new(
        caller,
        Box::new(SyntheticWorkerManager::new(1)),
        Box::new(OptimisationProblem::new()),
        Box::new(RandomSearchPolicy::new(5)),
        options,
        Some(Box::new(BufferReporter::new())),
    )
    .unwrap();

    let history = designer.run_experiments(1e6).await.unwrap();

    assert_eq!(history.num_completed_evals(), 3);
    assert!(history
        .query_points
        .iter()
        .all(|p| p == &json!([0.125])));
    assert_core_invariants(&history);
}

#[tokio::test]
async fn test_task_pool_realtime_run() {
    let caller = Arc::new(FunctionCaller::new(unit_domain(), |_, _| {
        QueryVal::Val(4.0)
    }));
    let options = DesignerOptions {
        capital_type: "realtime".parse().unwrap(),
        max_num_steps: 9,
        num_init_evals: 3,
        ..DesignerOptions::default()
    };
    let worker_manager: Box<dyn WorkerManager> =
        Box::new(TaskWorkerManager::new(3, Duration::from_millis(1)));
    let mut designer = ExperimentDesigner::new(
        caller,
        worker_manager,
        Box::new(OptimisationProblem::new()),
        Box::new(RandomSearchPolicy::new(9)),
        options,
        Some(Box::new(BufferReporter::new())),
    )
    .unwrap();

    let history = designer.run_experiments(120.0).await.unwrap();

    assert_eq!(history.num_completed_evals(), 9);
    assert_eq!(designer.num_succ_queries(), 9);
    assert!(designer.eval_idxs_in_progress().is_empty());
    assert_core_invariants(&history);
}
