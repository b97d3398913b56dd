//! ERC-3668 offchain lookups (CCIP-read).
//!
//! A resolver that keeps its records offchain reverts with
//! `OffchainLookup`. The client asks one of the listed gateways for an
//! answer and hands it back to the contract through the named callback.

use crate::contracts::{ccipCallbackCall, OffchainLookup};
use crate::rpc::decode_hex_data;
use crate::{RpcClient, SdkError};
use alloy_sol_types::{SolCall, SolError};
use enslookup_types::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Offchain redirects followed for one call before giving up.
pub const MAX_OFFCHAIN_HOPS: usize = 4;

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    data: &'a str,
    sender: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    data: String,
}

/// Decode revert data as an `OffchainLookup`, or `None` for any other revert.
pub fn decode_offchain_lookup(revert: &[u8]) -> Result<Option<OffchainLookup>, SdkError> {
    if !revert.starts_with(&OffchainLookup::SELECTOR) {
        return Ok(None);
    }
    Ok(Some(OffchainLookup::abi_decode(revert, false)?))
}

/// Ask the gateways of `lookup` in order; the first answer wins.
pub async fn query_gateways(rpc: &RpcClient, lookup: &OffchainLookup) -> Result<Vec<u8>, SdkError> {
    let sender = format!("0x{}", Address::from(lookup.sender).to_lower_hex());
    let data = format!("0x{}", hex::encode(&lookup.callData));
    let mut failures = Vec::new();

    for template in &lookup.urls {
        let url = template
            .replace("{sender}", &sender)
            .replace("{data}", &data);
        // templates without {data} take the request as a POST body
        let result: Result<GatewayResponse, SdkError> = if template.contains("{data}") {
            rpc.get_json(&url).await
        } else {
            let body = GatewayRequest {
                data: &data,
                sender: &sender,
            };
            rpc.post_json(&url, &body).await
        };

        match result.and_then(|response| decode_hex_data(&response.data)) {
            Ok(answer) => {
                debug!(gateway = %template, bytes = answer.len(), "offchain gateway answered");
                return Ok(answer);
            }
            Err(err) => {
                warn!(gateway = %template, %err, "offchain gateway failed");
                failures.push(format!("{template}: {err}"));
            }
        }
    }

    if failures.is_empty() {
        return Err(SdkError::offchain_error("revert lists no gateways"));
    }
    Err(SdkError::offchain_error(failures.join("; ")))
}

/// Calldata for the callback named in `lookup`, carrying the gateway answer.
pub fn callback_data(lookup: &OffchainLookup, response: Vec<u8>) -> Vec<u8> {
    let mut data = ccipCallbackCall {
        response: response.into(),
        extraData: lookup.extraData.clone(),
    }
    .abi_encode();
    data[..4].copy_from_slice(&lookup.callbackFunction.0);
    data
}
