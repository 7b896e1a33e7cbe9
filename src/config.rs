//! Designer configuration
//!
//! Enumerated options controlling the dispatch loop, with defaults,
//! validation, and environment-based overrides (`BLACKBIRD_*` variables).

use crate::capital::CapitalType;
use crate::error::{DesignerError, DesignerResult};
use crate::qinfo::{PrevEvaluations, QInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Parallelisation mode of the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Dispatch one query whenever a worker frees up
    Asy,
    /// Dispatch one batch whenever every worker is idle
    Syn,
}

impl Mode {
    /// Whether this is the asynchronous mode
    pub fn is_asynchronous(&self) -> bool {
        matches!(self, Mode::Asy)
    }

    /// The prefix composed into the full policy name
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Asy => "asy",
            Mode::Syn => "syn",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = DesignerError;

    /// Prefix match: anything starting with `asy` (case-insensitive) is
    /// asynchronous, everything else synchronous.
    fn from_str(s: &str) -> DesignerResult<Self> {
        if s.to_lowercase().starts_with("asy") {
            Ok(Mode::Asy)
        } else {
            Ok(Mode::Syn)
        }
    }
}

/// Caller-supplied initial-query generator
pub type InitialQInfoGenerator = Arc<dyn Fn(usize) -> Vec<QInfo> + Send + Sync>;

/// Options for an experiment-designer run
#[derive(Clone, Serialize, Deserialize)]
pub struct DesignerOptions {
    /// Stop once this many queries have been dispatched
    pub max_num_steps: u64,
    /// Capital accounting mode
    pub capital_type: CapitalType,
    /// Asynchronous or synchronous scheduling
    pub mode: Mode,
    /// Rebuild the policy's model every this many steps
    pub build_new_model_every: u64,
    /// Emit a progress line every this many steps
    pub report_results_every: u64,
    /// Capital to use for initialisation. Advisory: initialisation effort
    /// is currently driven by `num_init_evals`; a policy may consult this.
    pub init_capital: Option<f64>,
    /// Fraction of total capital to use for initialisation. Advisory, as
    /// `init_capital`.
    pub init_capital_frac: Option<f64>,
    /// Number of initial evaluations; non-positive skips initialisation
    pub num_init_evals: i64,
    /// Tag passed through to the policy's initial-query generation
    pub init_method: String,
    /// Initial-fidelity analogue of `init_method` (multi-fidelity mode)
    pub fidel_init_method: String,
    /// Probability an initial query evaluates at the optimisation fidelity
    /// (multi-fidelity mode)
    pub init_set_to_fidel_to_opt_with_prob: f64,
    /// Previously completed evaluations; when present, initial-query
    /// generation is skipped entirely
    pub prev_evaluations: Option<PrevEvaluations>,
    /// Caller-supplied initial-query generator, taking precedence over the
    /// policy's own
    #[serde(skip)]
    pub get_initial_qinfos: Option<InitialQInfoGenerator>,
}

impl Default for DesignerOptions {
    fn default() -> Self {
        Self {
            max_num_steps: 10_000_000,
            capital_type: CapitalType::ReturnValue,
            mode: Mode::Asy,
            build_new_model_every: 17,
            report_results_every: 1,
            init_capital: None,
            init_capital_frac: None,
            num_init_evals: 20,
            init_method: "rand".to_string(),
            fidel_init_method: "rand".to_string(),
            init_set_to_fidel_to_opt_with_prob: 0.25,
            prev_evaluations: None,
            get_initial_qinfos: None,
        }
    }
}

impl fmt::Debug for DesignerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignerOptions")
            .field("max_num_steps", &self.max_num_steps)
            .field("capital_type", &self.capital_type)
            .field("mode", &self.mode)
            .field("build_new_model_every", &self.build_new_model_every)
            .field("report_results_every", &self.report_results_every)
            .field("init_capital", &self.init_capital)
            .field("init_capital_frac", &self.init_capital_frac)
            .field("num_init_evals", &self.num_init_evals)
            .field("init_method", &self.init_method)
            .field("fidel_init_method", &self.fidel_init_method)
            .field(
                "init_set_to_fidel_to_opt_with_prob",
                &self.init_set_to_fidel_to_opt_with_prob,
            )
            .field(
                "prev_evaluations",
                &self.prev_evaluations.as_ref().map(|p| p.qinfos.len()),
            )
            .field("get_initial_qinfos", &self.get_initial_qinfos.is_some())
            .finish()
    }
}

impl DesignerOptions {
    /// Validate option values
    pub fn validate(&self) -> DesignerResult<()> {
        if self.max_num_steps == 0 {
            return Err(DesignerError::Validation(
                "max_num_steps must be at least 1".to_string(),
            ));
        }
        if self.build_new_model_every == 0 {
            return Err(DesignerError::Validation(
                "build_new_model_every must be at least 1".to_string(),
            ));
        }
        if self.report_results_every == 0 {
            return Err(DesignerError::Validation(
                "report_results_every must be at least 1".to_string(),
            ));
        }
        for (name, cap) in [
            ("init_capital", self.init_capital),
            ("init_capital_frac", self.init_capital_frac),
        ] {
            if let Some(c) = cap {
                if !c.is_finite() || c < 0.0 {
                    return Err(DesignerError::Validation(format!(
                        "{name} must be a non-negative finite number, got {c}"
                    )));
                }
            }
        }
        if !(0.0..=1.0).contains(&self.init_set_to_fidel_to_opt_with_prob) {
            return Err(DesignerError::Validation(format!(
                "init_set_to_fidel_to_opt_with_prob must lie in [0, 1], got {}",
                self.init_set_to_fidel_to_opt_with_prob
            )));
        }
        Ok(())
    }

    /// Apply `BLACKBIRD_*` environment overrides on top of these options
    pub fn apply_env_overrides(mut self) -> DesignerResult<Self> {
        if let Ok(val) = std::env::var("BLACKBIRD_MODE") {
            self.mode = val.parse()?;
        }
        if let Ok(val) = std::env::var("BLACKBIRD_CAPITAL_TYPE") {
            self.capital_type = val.parse()?;
        }
        if let Ok(val) = std::env::var("BLACKBIRD_MAX_NUM_STEPS") {
            self.max_num_steps = val.parse().map_err(|_| {
                DesignerError::Validation(format!("BLACKBIRD_MAX_NUM_STEPS: {val}"))
            })?;
        }
        if let Ok(val) = std::env::var("BLACKBIRD_BUILD_NEW_MODEL_EVERY") {
            self.build_new_model_every = val.parse().map_err(|_| {
                DesignerError::Validation(format!("BLACKBIRD_BUILD_NEW_MODEL_EVERY: {val}"))
            })?;
        }
        if let Ok(val) = std::env::var("BLACKBIRD_REPORT_RESULTS_EVERY") {
            self.report_results_every = val.parse().map_err(|_| {
                DesignerError::Validation(format!("BLACKBIRD_REPORT_RESULTS_EVERY: {val}"))
            })?;
        }
        if let Ok(val) = std::env::var("BLACKBIRD_NUM_INIT_EVALS") {
            self.num_init_evals = val.parse().map_err(|_| {
                DesignerError::Validation(format!("BLACKBIRD_NUM_INIT_EVALS: {val}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }
}
