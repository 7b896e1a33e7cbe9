//! Capital accounting
//!
//! Capital is the abstract budget evaluations consume. Three clock
//! strategies measure it: an abstract scalar advanced by reported
//! evaluation times (simulations), the process CPU clock, or wall-clock
//! time. Both real clocks are captured once at init and read relative to
//! that stamp.

use crate::error::{DesignerError, DesignerResult};
use cpu_time::ProcessTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Capital accounting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalType {
    /// Abstract scalar advanced by reported evaluation times
    ReturnValue,
    /// Process CPU time since init
    CpuTime,
    /// Wall-clock time since init
    RealTime,
}

impl CapitalType {
    /// Stable tag string for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            CapitalType::ReturnValue => "return_value",
            CapitalType::CpuTime => "cputime",
            CapitalType::RealTime => "realtime",
        }
    }
}

impl fmt::Display for CapitalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapitalType {
    type Err = DesignerError;

    fn from_str(s: &str) -> DesignerResult<Self> {
        match s {
            "return_value" => Ok(CapitalType::ReturnValue),
            "cputime" => Ok(CapitalType::CpuTime),
            "realtime" => Ok(CapitalType::RealTime),
            other => Err(DesignerError::UnknownCapitalType(other.to_string())),
        }
    }
}

/// Clock measuring spent capital under one of the accounting modes
#[derive(Debug)]
pub enum CapitalClock {
    /// Abstract scalar; only this variant honours `set_spent`
    ReturnValue {
        /// Capital spent so far
        spent: f64,
    },
    /// Process CPU clock captured at init
    CpuTime {
        /// Init stamp; `None` until `init` runs
        start: Option<ProcessTime>,
    },
    /// Wall clock captured at init
    RealTime {
        /// Init stamp; `None` until `init` runs
        start: Option<Instant>,
    },
}

impl CapitalClock {
    /// Create an uninitialised clock for `capital_type`
    pub fn new(capital_type: CapitalType) -> Self {
        match capital_type {
            CapitalType::ReturnValue => CapitalClock::ReturnValue { spent: 0.0 },
            CapitalType::CpuTime => CapitalClock::CpuTime { start: None },
            CapitalType::RealTime => CapitalClock::RealTime { start: None },
        }
    }

    /// The accounting mode this clock implements
    pub fn capital_type(&self) -> CapitalType {
        match self {
            CapitalClock::ReturnValue { .. } => CapitalType::ReturnValue,
            CapitalClock::CpuTime { .. } => CapitalType::CpuTime,
            CapitalClock::RealTime { .. } => CapitalType::RealTime,
        }
    }

    /// Capture the init stamp (or reset the abstract scalar).
    ///
    /// Called once when a run starts; spent capital is measured from here.
    pub fn init(&mut self) -> DesignerResult<()> {
        match self {
            CapitalClock::ReturnValue { spent } => *spent = 0.0,
            CapitalClock::CpuTime { start } => {
                *start = Some(ProcessTime::try_now().map_err(DesignerError::from)?);
            }
            CapitalClock::RealTime { start } => *start = Some(Instant::now()),
        }
        Ok(())
    }

    /// Capital spent since init.
    ///
    /// Before `init` runs no capital has been spent.
    pub fn spent(&self) -> f64 {
        match self {
            CapitalClock::ReturnValue { spent } => *spent,
            CapitalClock::CpuTime { start } => start
                .as_ref()
                .and_then(|s| s.try_elapsed().ok())
                .map_or(0.0, |d| d.as_secs_f64()),
            CapitalClock::RealTime { start } => {
                start.map_or(0.0, |s| s.elapsed().as_secs_f64())
            }
        }
    }

    /// Overwrite spent capital. Meaningful only for the abstract scalar;
    /// the real clocks ignore it.
    pub fn set_spent(&mut self, value: f64) {
        if let CapitalClock::ReturnValue { spent } = self {
            *spent = value;
        }
    }

    /// Receive time for a completed query.
    ///
    /// Under the abstract scalar the result lands exactly when its reported
    /// evaluation time elapses after the send; under the real clocks it
    /// lands now.
    pub fn receive_time_for(&self, send_time: f64, eval_time: f64) -> f64 {
        match self {
            CapitalClock::ReturnValue { .. } => send_time + eval_time,
            CapitalClock::CpuTime { .. } | CapitalClock::RealTime { .. } => self.spent(),
        }
    }
}
