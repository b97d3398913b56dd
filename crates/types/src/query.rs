use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which direction a lookup resolves in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Input is an ENS name; resolve it to an address.
    #[default]
    Name,
    /// Input is an address; reverse-resolve it to a name.
    Address,
}

impl LookupMode {
    pub const ALL: [LookupMode; 2] = [LookupMode::Name, LookupMode::Address];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupMode::Name => "name",
            LookupMode::Address => "address",
        }
    }

    /// Label shown in the mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            LookupMode::Name => "ENS Name",
            LookupMode::Address => "Ethereum Address",
        }
    }

    /// Hint shown in the empty input field.
    pub fn placeholder(&self) -> &'static str {
        match self {
            LookupMode::Name => "Enter ENS name (e.g., vitalik.eth)",
            LookupMode::Address => "Enter Ethereum address (0x...)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lookup mode `{0}` (expected `name` or `address`)")]
pub struct UnknownModeError(pub String);

impl FromStr for LookupMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(LookupMode::Name),
            "address" | "addr" => Ok(LookupMode::Address),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, submitted lookup request.
///
/// The value is the trimmed user input; name normalization and address
/// parsing happen on the resolution path so that a bad value surfaces as
/// a failed lookup rather than a form error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupQuery {
    pub mode: LookupMode,
    pub value: String,
}

impl LookupQuery {
    pub fn new(mode: LookupMode, value: impl AsRef<str>) -> Self {
        Self {
            mode,
            value: value.as_ref().trim().to_string(),
        }
    }

    pub fn name(value: impl AsRef<str>) -> Self {
        Self::new(LookupMode::Name, value)
    }

    pub fn address(value: impl AsRef<str>) -> Self {
        Self::new(LookupMode::Address, value)
    }

    /// Empty queries resolve nothing.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Name".parse::<LookupMode>().unwrap(), LookupMode::Name);
        assert_eq!(" ADDRESS ".parse::<LookupMode>().unwrap(), LookupMode::Address);
        assert!("ens".parse::<LookupMode>().is_err());
    }

    #[test]
    fn query_trims_value() {
        let query = LookupQuery::name("  vitalik.eth\n");
        assert_eq!(query.value, "vitalik.eth");
        assert!(!query.is_empty());
        assert!(LookupQuery::address("   ").is_empty());
    }

    #[test]
    fn mode_serializes_lowercase() {
        let json = serde_json::to_string(&LookupMode::Address).unwrap();
        assert_eq!(json, "\"address\"");
    }
}
