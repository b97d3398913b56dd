use crate::hash::{keccak256, H256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while normalizing an ENS name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("name `{name}` contains an empty label")]
    EmptyLabel { name: String },
    #[error("name `{name}` is not normalizable: {reason}")]
    Invalid { name: String, reason: String },
    #[error("label `{label}` is longer than 255 bytes")]
    LabelTooLong { label: String },
}

/// Canonicalize a raw name into the form ENS lookups expect (ENSIP-15).
///
/// Surrounding whitespace is ignored. Mapped characters are folded
/// (`Ｖitalik.ETH` becomes `vitalik.eth`), emoji presentation selectors are
/// dropped, and disallowed, confusable or mixed-script labels are rejected.
pub fn normalize(raw: &str) -> Result<String, NameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.split('.').any(str::is_empty) {
        return Err(NameError::EmptyLabel {
            name: trimmed.to_string(),
        });
    }

    let normalized =
        ens_normalize_rs::normalize(trimmed).map_err(|err| NameError::Invalid {
            name: trimmed.to_string(),
            reason: err.to_string(),
        })?;

    // dns_encode() needs single-byte label lengths
    if let Some(label) = normalized.split('.').find(|label| label.len() > 255) {
        return Err(NameError::LabelTooLong {
            label: label.to_string(),
        });
    }
    Ok(normalized)
}

/// Keccak-256 of a single label.
pub fn labelhash(label: &str) -> H256 {
    keccak256(label.as_bytes())
}

/// EIP-137 namehash of a dotted name. The empty name hashes to zero.
pub fn namehash(name: &str) -> H256 {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&labelhash(label));
        node = keccak256(buf);
    }
    node
}

/// A normalized ENS name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnsName(String);

impl EnsName {
    /// Normalize `raw` into a name.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        normalize(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn namehash(&self) -> H256 {
        namehash(&self.0)
    }

    /// Name with its first label removed, or `None` for a single-label name.
    pub fn parent(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, parent)| parent)
    }

    /// DNS wire encoding: length-prefixed labels and a terminating zero byte.
    pub fn dns_encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.len() + 2);
        for label in self.labels() {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
        out
    }

    /// The reverse-registrar name for `address`: `<hex>.addr.reverse`.
    pub fn reverse(address: &crate::Address) -> Self {
        Self(format!("{}.addr.reverse", address.to_lower_hex()))
    }
}

impl FromStr for EnsName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EnsName> for String {
    fn from(value: EnsName) -> Self {
        value.0
    }
}

impl TryFrom<String> for EnsName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
