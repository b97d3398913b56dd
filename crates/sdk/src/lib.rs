//! Client side of ENS lookups: a JSON-RPC transport for an Ethereum node,
//! the ENS contract interfaces, and resolution of addresses, names, text
//! records and avatars on top of them, including offchain (CCIP-read)
//! resolvers.

pub mod avatar;
pub mod ccip;
pub mod contracts;
mod ens;
mod error;
mod rpc;

pub use crate::avatar::AvatarGateways;
pub use crate::ens::{EnsClient, ResolverRef, ENS_REGISTRY, EXTENDED_RESOLVER_INTERFACE};
pub use crate::error::SdkError;
pub use crate::rpc::{RpcClient, DEFAULT_TIMEOUT};
