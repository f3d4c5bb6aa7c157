use std::fmt;

/// Outcome of ticking a node.
///
/// `Invalid` is the state of a node that has never been ticked or was interrupted; `update()`
/// must never produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BtStatus {
    Running,
    Success,
    Failure,
    #[default]
    Invalid,
}

impl BtStatus {
    pub fn is_resolved(self) -> bool {
        matches!(self, BtStatus::Success | BtStatus::Failure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BtStatus::Running => "RUNNING",
            BtStatus::Success => "SUCCESS",
            BtStatus::Failure => "FAILURE",
            BtStatus::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for BtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
