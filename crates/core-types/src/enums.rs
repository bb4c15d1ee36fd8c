use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a trade as recorded by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Long,
    Short,
}

impl TradeAction {
    /// Returns the lowercase token the ledger stores for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Long => "long",
            TradeAction::Short => "short",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(TradeAction::Long),
            "short" => Ok(TradeAction::Short),
            other => Err(CoreError::InvalidInput("action", other.to_string())),
        }
    }
}

/// The lifecycle state of a trade. A trade is `Open` from entry until the bot
/// records an exit, at which point it becomes `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl TradeStatus {
    /// Returns the lowercase token the ledger stores for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            other => Err(CoreError::InvalidInput("status", other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_its_storage_token() {
        assert_eq!("long".parse::<TradeAction>().unwrap(), TradeAction::Long);
        assert_eq!("short".parse::<TradeAction>().unwrap(), TradeAction::Short);
        assert_eq!(TradeAction::Long.as_str(), "long");
        assert_eq!(TradeAction::Short.to_string(), "short");
    }

    #[test]
    fn status_round_trips_through_its_storage_token() {
        assert_eq!("open".parse::<TradeStatus>().unwrap(), TradeStatus::Open);
        assert_eq!("closed".parse::<TradeStatus>().unwrap(), TradeStatus::Closed);
        assert_eq!(TradeStatus::Closed.to_string(), "closed");
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!("sideways".parse::<TradeAction>().is_err());
        assert!("OPEN".parse::<TradeStatus>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_tokens() {
        assert_eq!(serde_json::to_string(&TradeAction::Short).unwrap(), "\"short\"");
        let status: TradeStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(status, TradeStatus::Closed);
    }
}
