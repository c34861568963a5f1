//! Verdict definitions shared by the evaluator and the process boundary

use std::fmt;
use std::process::ExitCode;

/// Health classification of one evaluation, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Verdict {
    #[default]
    Ok,
    Warning,
    Critical,
}

impl Verdict {
    /// Sensu / Nagios check exit code
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Ok => 0,
            Verdict::Warning => 1,
            Verdict::Critical => 2,
        }
    }

    /// Raise to `other` if it is more severe, never lower
    pub fn escalate(&mut self, other: Verdict) {
        *self = (*self).max(other);
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Ok => "OK",
            Verdict::Warning => "WARNING",
            Verdict::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

impl From<Verdict> for ExitCode {
    fn from(verdict: Verdict) -> Self {
        ExitCode::from(verdict.exit_code())
    }
}
