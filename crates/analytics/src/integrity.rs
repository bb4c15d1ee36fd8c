use thiserror::Error;

/// A consistency problem found in the trade ledger.
///
/// These are observations, not failures: the bot writes the trade row and the
/// result row separately, so a crash between the two leaves gaps. The
/// analytics tolerate every one of these; the audit exists so the gaps are
/// reported instead of silently absorbed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    #[error("trade {0} is closed but has no result row")]
    MissingResult(i64),

    #[error("trade {0} is closed but its result has no close timestamp")]
    MissingCloseTimestamp(i64),

    #[error("trade {0} is closed but its result has no pnl")]
    MissingPnl(i64),

    #[error("trade {0} is open but already has a result row")]
    ResultOnOpenTrade(i64),
}

impl IntegrityIssue {
    /// The id of the trade the issue was found on.
    pub fn trade_id(&self) -> i64 {
        match self {
            IntegrityIssue::MissingResult(id)
            | IntegrityIssue::MissingCloseTimestamp(id)
            | IntegrityIssue::MissingPnl(id)
            | IntegrityIssue::ResultOnOpenTrade(id) => *id,
        }
    }
}
