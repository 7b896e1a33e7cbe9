//! Uniform random search
//!
//! Queries are independent uniform draws from the domain. No model is
//! kept, which makes this the standard baseline and the fallback
//! initial-query generator for model-based policies.

use crate::error::{DesignerError, DesignerResult};
use crate::hooks::{PolicyHooks, QueryContext};
use crate::qinfo::QInfo;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Policy drawing every query uniformly at random from the domain
pub struct RandomSearchPolicy {
    rng: StdRng,
    /// Probability an initial query evaluates at the optimisation fidelity
    /// rather than a random one (multi-fidelity callers only)
    fidel_to_opt_prob: f64,
}

impl RandomSearchPolicy {
    /// Create a seeded random-search policy
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            fidel_to_opt_prob: 0.25,
        }
    }

    /// Override the probability that initial queries use the optimisation
    /// fidelity
    pub fn with_fidel_to_opt_prob(mut self, prob: f64) -> Self {
        self.fidel_to_opt_prob = prob.clamp(0.0, 1.0);
        self
    }

    fn draw(&mut self, ctx: &QueryContext<'_>) -> DesignerResult<QInfo> {
        let point = ctx.domain.sample(&mut self.rng).ok_or_else(|| {
            DesignerError::QuerySelection(format!(
                "cannot draw a random point from the {} domain",
                ctx.domain.kind()
            ))
        })?;
        Ok(QInfo::new(point))
    }
}

impl PolicyHooks for RandomSearchPolicy {
    fn policy_set_up(&mut self) -> DesignerResult<()> {
        Ok(())
    }

    fn policy_str(&self) -> String {
        "rand".to_string()
    }

    fn is_mf_policy(&self) -> bool {
        false
    }

    fn policy_run_experiments_initialise(&mut self) -> DesignerResult<()> {
        Ok(())
    }

    fn policy_update_history(&mut self, _qinfo: &QInfo) {}

    fn determine_next_query(&mut self, ctx: &QueryContext<'_>) -> DesignerResult<QInfo> {
        self.draw(ctx)
    }

    fn determine_next_batch_of_queries(
        &mut self,
        ctx: &QueryContext<'_>,
        batch_size: usize,
    ) -> DesignerResult<Vec<QInfo>> {
        (0..batch_size).map(|_| self.draw(ctx)).collect()
    }

    fn get_initial_qinfos(&mut self, ctx: &QueryContext<'_>, num: usize) -> Vec<QInfo> {
        let mut qinfos = Vec::with_capacity(num);
        for _ in 0..num {
            let Ok(mut qinfo) = self.draw(ctx) else {
                break;
            };
            if let Some(fidel_space) = ctx.fidel_space {
                qinfo.fidel = if self.rng.gen_bool(self.fidel_to_opt_prob) {
                    ctx.fidel_to_opt.cloned()
                } else {
                    fidel_space.sample(&mut self.rng)
                };
            }
            qinfos.push(qinfo);
        }
        qinfos
    }

    fn policy_report_results_str(&self) -> String {
        String::new()
    }
}
