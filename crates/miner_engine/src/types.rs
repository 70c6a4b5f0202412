use std::fmt;

/// Identifier of a work unit: the item slug it mines.
pub type UnitId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl UnitStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, UnitStatus::Done | UnitStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitExit {
    pub success: bool,
    pub message: String,
}

/// One independently schedulable scrape task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub id: UnitId,
    pub status: UnitStatus,
    /// Captured stdout/stderr of the worker.
    pub output: String,
    pub exit: Option<UnitExit>,
}

impl WorkUnit {
    pub fn new(id: impl Into<UnitId>) -> Self {
        Self {
            id: id.into(),
            status: UnitStatus::Pending,
            output: String::new(),
            exit: None,
        }
    }

    pub(crate) fn mark_running(&mut self) {
        self.status = UnitStatus::Running;
    }

    pub(crate) fn complete(&mut self, success: bool, message: impl Into<String>) {
        self.status = if success {
            UnitStatus::Done
        } else {
            UnitStatus::Failed
        };
        self.exit = Some(UnitExit {
            success,
            message: message.into(),
        });
    }
}

/// Why a page could not be fetched. Scoped to one page or one unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({kind})")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => f.write_str("bad url"),
            FailureKind::HttpStatus(code) => write!(f, "status {code}"),
            FailureKind::Timeout => f.write_str("timed out"),
            FailureKind::RedirectLimitExceeded => f.write_str("too many redirects"),
            FailureKind::TooLarge { max_bytes, actual } => match actual {
                Some(actual) => write!(f, "{actual} bytes, limit {max_bytes}"),
                None => write!(f, "over {max_bytes} bytes"),
            },
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "content type {content_type}")
            }
            FailureKind::Network => f.write_str("network"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FailureKind, FetchError, UnitStatus, WorkUnit};

    #[test]
    fn completing_a_unit_sets_terminal_status() {
        let mut unit = WorkUnit::new("blade-of-awe");
        assert_eq!(unit.status, UnitStatus::Pending);
        assert!(!unit.status.is_terminal());

        unit.mark_running();
        assert!(!unit.status.is_terminal());

        unit.complete(false, "exit status 1");
        assert_eq!(unit.status, UnitStatus::Failed);
        assert!(unit.status.is_terminal());
        assert_eq!(unit.exit.map(|exit| exit.message).as_deref(), Some("exit status 1"));
    }

    #[test]
    fn fetch_error_message_names_the_kind() {
        let err = FetchError::new(FailureKind::HttpStatus(503), "http://wiki/p/2 answered 503");
        assert_eq!(err.to_string(), "http://wiki/p/2 answered 503 (status 503)");
    }
}
