use enslookup_types::{AddressError, NameError};
use thiserror::Error;

/// Errors that can occur when talking to an Ethereum JSON-RPC node or
/// decoding what it returns.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("call reverted: {message}")]
    Reverted { message: String, data: Vec<u8> },
    #[error("offchain lookup failed: {0}")]
    OffchainLookup(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("abi decode error: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),
    #[error("invalid name: {0}")]
    Name(#[from] NameError),
}

impl SdkError {
    pub(crate) fn parse_error(msg: impl Into<String>) -> Self {
        SdkError::Parse(msg.into())
    }

    pub(crate) fn offchain_error(msg: impl Into<String>) -> Self {
        SdkError::OffchainLookup(msg.into())
    }

    pub(crate) fn server_error(status: u16, message: impl Into<String>) -> Self {
        SdkError::ServerError {
            status,
            message: message.into(),
        }
    }

    /// Whether the node reported that the call reverted.
    ///
    /// Resolvers revert for records or interfaces they do not implement,
    /// which lookups treat as absent data.
    pub fn is_revert(&self) -> bool {
        matches!(self, SdkError::Reverted { .. })
    }
}
