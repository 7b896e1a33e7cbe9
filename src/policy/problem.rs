//! Problem-side bookkeeping for optimisation runs

use crate::domain::Point;
use crate::error::DesignerResult;
use crate::hooks::ProblemHooks;
use crate::qinfo::{QInfo, QueryVal};

/// Tracks the best successful value seen so far
#[derive(Debug, Default)]
pub struct OptimisationProblem {
    curr_max_val: Option<f64>,
    curr_max_point: Option<Point>,
}

impl OptimisationProblem {
    /// Create a tracker with no data yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Best successful value seen so far
    pub fn curr_max_val(&self) -> Option<f64> {
        self.curr_max_val
    }

    /// Point achieving the best value seen so far
    pub fn curr_max_point(&self) -> Option<&Point> {
        self.curr_max_point.as_ref()
    }

    fn note(&mut self, point: &Point, val: f64) {
        if self.curr_max_val.is_none_or(|best| val > best) {
            self.curr_max_val = Some(val);
            self.curr_max_point = Some(point.clone());
        }
    }
}

impl ProblemHooks for OptimisationProblem {
    fn problem_set_up(&mut self) -> DesignerResult<()> {
        Ok(())
    }

    fn problem_str(&self) -> String {
        "opt".to_string()
    }

    fn problem_handle_prev_evals(&mut self, points: &[Point], vals: &[QueryVal]) {
        for (point, val) in points.iter().zip(vals) {
            if let QueryVal::Val(v) = val {
                self.note(point, *v);
            }
        }
    }

    fn problem_run_experiments_initialise(&mut self) -> DesignerResult<()> {
        Ok(())
    }

    fn problem_update_history(&mut self, qinfo: &QInfo) {
        if let Some(QueryVal::Val(v)) = qinfo.val {
            self.note(&qinfo.point, v);
        }
    }

    fn problem_report_results_str(&self) -> String {
        match self.curr_max_val {
            Some(v) => format!("curr_max: {v:.4}"),
            None => "curr_max: -".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tracks_running_maximum_ignoring_failures() {
        let mut problem = OptimisationProblem::new();
        assert_eq!(problem.problem_report_results_str(), "curr_max: -");

        let mut q = QInfo::new(json!([0.2]));
        q.val = Some(QueryVal::Val(1.5));
        problem.problem_update_history(&q);

        let mut worse = QInfo::new(json!([0.8]));
        worse.val = Some(QueryVal::Val(0.5));
        problem.problem_update_history(&worse);

        let mut failed = QInfo::new(json!([0.9]));
        failed.val = Some(QueryVal::EvalError);
        problem.problem_update_history(&failed);

        assert_eq!(problem.curr_max_val(), Some(1.5));
        assert_eq!(problem.curr_max_point(), Some(&json!([0.2])));
        assert_eq!(problem.problem_report_results_str(), "curr_max: 1.5000");
    }

    #[test]
    fn test_prev_evals_seed_the_maximum() {
        let mut problem = OptimisationProblem::new();
        problem.problem_handle_prev_evals(
            &[json!([0.1]), json!([0.4])],
            &[QueryVal::Val(2.0), QueryVal::EvalError],
        );
        assert_eq!(problem.curr_max_val(), Some(2.0));
    }
}
