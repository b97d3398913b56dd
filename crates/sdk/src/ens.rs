//! ENS resolution over `eth_call`.

use crate::avatar::{
    decode_json_data_uri, expand_erc1155_uri, AvatarGateways, AvatarUri, NftMetadata, NftRef,
    NftStandard,
};
use crate::ccip::{self, MAX_OFFCHAIN_HOPS};
use crate::contracts::{Erc1155, Erc721, EnsRegistry, ExtendedResolver, PublicResolver};
use crate::{RpcClient, SdkError};
use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use enslookup_types::{namehash, Address, EnsName, AVATAR_KEY};
use tracing::debug;

/// ENS registry address, identical on mainnet and the public testnets.
pub const ENS_REGISTRY: Address = Address([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x2e, 0x07, 0x4e, 0xc6, 0x9a, 0x0d, 0xfb, 0x29, 0x97, 0xba,
    0x6c, 0x7d, 0x2e, 0x1e,
]);

/// ENSIP-10 `resolve(bytes,bytes)` interface id.
pub const EXTENDED_RESOLVER_INTERFACE: [u8; 4] =
    <ExtendedResolver::resolveCall as SolCall>::SELECTOR;

/// Chain the configured RPC endpoint is expected to serve.
const MAINNET_CHAIN_ID: u64 = 1;

/// The resolver responsible for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverRef {
    pub address: Address,
    /// `false` when the resolver was found on an ancestor (wildcard).
    pub exact: bool,
}

/// ENS client: registry/resolver lookups, verified reverse resolution,
/// text records and avatar resolution.
#[derive(Clone)]
pub struct EnsClient {
    rpc: RpcClient,
    registry: Address,
    gateways: AvatarGateways,
}

impl EnsClient {
    pub fn new(rpc: RpcClient) -> Self {
        Self {
            rpc,
            registry: ENS_REGISTRY,
            gateways: AvatarGateways::default(),
        }
    }

    pub fn with_registry(mut self, registry: Address) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_gateways(mut self, gateways: AvatarGateways) -> Self {
        self.gateways = gateways;
        self
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn registry(&self) -> &Address {
        &self.registry
    }

    /// Find the resolver for `name`, walking up to its ancestors (ENSIP-10).
    pub async fn resolver(&self, name: &EnsName) -> Result<Option<ResolverRef>, SdkError> {
        let mut candidate = name.as_str();
        loop {
            let call = EnsRegistry::resolverCall {
                node: namehash(candidate).into(),
            }
            .abi_encode();
            if let Some(ret) = self.call_or_absent(&self.registry, &call).await? {
                let resolver = Address::from(
                    EnsRegistry::resolverCall::abi_decode_returns(&ret, false)?._0,
                );
                if !resolver.is_zero() {
                    debug!(name = %name, owner = candidate, resolver = %resolver, "found resolver");
                    return Ok(Some(ResolverRef {
                        address: resolver,
                        exact: candidate == name.as_str(),
                    }));
                }
            }
            match candidate.split_once('.') {
                Some((_, parent)) => candidate = parent,
                None => return Ok(None),
            }
        }
    }

    /// Forward resolution: the `addr` record of `name`.
    pub async fn resolve_address(&self, name: &EnsName) -> Result<Option<Address>, SdkError> {
        let call = PublicResolver::addrCall {
            node: name.namehash().into(),
        }
        .abi_encode();
        let Some(ret) = self.call_resolver(name, call).await? else {
            return Ok(None);
        };
        let address = Address::from(PublicResolver::addrCall::abi_decode_returns(&ret, false)?._0);
        Ok((!address.is_zero()).then_some(address))
    }

    /// A text record of `name`. Empty records read as absent.
    pub async fn text(&self, name: &EnsName, key: &str) -> Result<Option<String>, SdkError> {
        let call = PublicResolver::textCall {
            node: name.namehash().into(),
            key: key.to_string(),
        }
        .abi_encode();
        let Some(ret) = self.call_resolver(name, call).await? else {
            return Ok(None);
        };
        let value = PublicResolver::textCall::abi_decode_returns(&ret, false)?._0;
        Ok((!value.is_empty()).then_some(value))
    }

    /// Reverse resolution: the primary name of `address`.
    ///
    /// The name is only returned when it forward-resolves back to `address`.
    pub async fn lookup_address(&self, address: &Address) -> Result<Option<EnsName>, SdkError> {
        let reverse = EnsName::reverse(address);
        let call = PublicResolver::nameCall {
            node: reverse.namehash().into(),
        }
        .abi_encode();
        let Some(ret) = self.call_resolver(&reverse, call).await? else {
            return Ok(None);
        };
        let raw = PublicResolver::nameCall::abi_decode_returns(&ret, false)?._0;
        if raw.is_empty() {
            return Ok(None);
        }

        let name = match EnsName::parse(&raw) {
            Ok(name) => name,
            Err(err) => {
                debug!(%address, %raw, %err, "reverse record is not a valid name");
                return Ok(None);
            }
        };

        match self.resolve_address(&name).await? {
            Some(forward) if forward == *address => Ok(Some(name)),
            forward => {
                debug!(%address, %name, ?forward, "reverse record failed forward verification");
                Ok(None)
            }
        }
    }

    /// The avatar of `name` as a fetchable URL.
    pub async fn avatar(&self, name: &EnsName) -> Result<Option<String>, SdkError> {
        let Some(record) = self.text(name, AVATAR_KEY).await? else {
            return Ok(None);
        };
        match AvatarUri::parse(&record) {
            Some(AvatarUri::Nft(nft)) => self.nft_image(&nft).await,
            Some(uri) => Ok(uri.gateway_url(&self.gateways)),
            None => {
                debug!(name = %name, %record, "unrecognized avatar record");
                Ok(None)
            }
        }
    }

    async fn nft_image(&self, nft: &NftRef) -> Result<Option<String>, SdkError> {
        if nft.chain_id != MAINNET_CHAIN_ID {
            debug!(chain_id = nft.chain_id, "nft avatar on unsupported chain");
            return Ok(None);
        }

        let token_id: U256 = nft.token_id.trim().parse().map_err(|err| {
            SdkError::parse_error(format!("invalid token id `{}`: {err}", nft.token_id))
        })?;
        let call = match nft.standard {
            NftStandard::Erc721 => Erc721::tokenURICall { tokenId: token_id }.abi_encode(),
            NftStandard::Erc1155 => Erc1155::uriCall { id: token_id }.abi_encode(),
        };
        let Some(ret) = self.call_or_absent(&nft.contract, &call).await? else {
            return Ok(None);
        };
        let metadata_uri = match nft.standard {
            NftStandard::Erc721 => Erc721::tokenURICall::abi_decode_returns(&ret, false)?._0,
            NftStandard::Erc1155 => expand_erc1155_uri(
                &Erc1155::uriCall::abi_decode_returns(&ret, false)?._0,
                &token_id.to_be_bytes::<32>(),
            ),
        };

        let metadata: NftMetadata = match decode_json_data_uri(&metadata_uri) {
            Some(decoded) => decoded.map_err(SdkError::Parse)?,
            None => {
                let Some(url) =
                    AvatarUri::parse(&metadata_uri).and_then(|uri| uri.gateway_url(&self.gateways))
                else {
                    debug!(%metadata_uri, "unrecognized nft metadata uri");
                    return Ok(None);
                };
                self.rpc.get_json(&url).await?
            }
        };

        Ok(metadata
            .image_uri()
            .and_then(|image| AvatarUri::parse(&image))
            .and_then(|uri| uri.gateway_url(&self.gateways)))
    }

    /// Run `call` against the resolver of `name`, through `resolve(bytes,bytes)`
    /// when only an ancestor has a resolver.
    async fn call_resolver(
        &self,
        name: &EnsName,
        call: Vec<u8>,
    ) -> Result<Option<Vec<u8>>, SdkError> {
        let Some(resolver) = self.resolver(name).await? else {
            return Ok(None);
        };

        if resolver.exact {
            return self.call_or_absent(&resolver.address, &call).await;
        }

        if !self
            .supports_interface(&resolver.address, EXTENDED_RESOLVER_INTERFACE)
            .await?
        {
            debug!(name = %name, resolver = %resolver.address, "ancestor resolver is not wildcard-capable");
            return Ok(None);
        }

        let wrapped = ExtendedResolver::resolveCall {
            name: name.dns_encode().into(),
            data: call.into(),
        }
        .abi_encode();
        let Some(ret) = self.call_or_absent(&resolver.address, &wrapped).await? else {
            return Ok(None);
        };
        let inner = ExtendedResolver::resolveCall::abi_decode_returns(&ret, false)?._0;
        Ok((!inner.is_empty()).then(|| inner.to_vec()))
    }

    async fn supports_interface(
        &self,
        contract: &Address,
        interface: [u8; 4],
    ) -> Result<bool, SdkError> {
        let call = ExtendedResolver::supportsInterfaceCall {
            interfaceID: interface.into(),
        }
        .abi_encode();
        match self.call_or_absent(contract, &call).await? {
            Some(ret) => {
                Ok(ExtendedResolver::supportsInterfaceCall::abi_decode_returns(&ret, false)?._0)
            }
            None => Ok(false),
        }
    }

    /// `eth_call` where a revert or empty return data means "absent".
    ///
    /// `OffchainLookup` reverts are followed through their gateways and the
    /// contract callback (ERC-3668).
    async fn call_or_absent(
        &self,
        to: &Address,
        data: &[u8],
    ) -> Result<Option<Vec<u8>>, SdkError> {
        let mut call = data.to_vec();
        for _ in 0..=MAX_OFFCHAIN_HOPS {
            match self.rpc.eth_call(to, &call).await {
                Ok(ret) if ret.is_empty() => return Ok(None),
                Ok(ret) => return Ok(Some(ret)),
                Err(SdkError::Reverted { message, data }) => {
                    let Some(lookup) = ccip::decode_offchain_lookup(&data)? else {
                        debug!(contract = %to, %message, "call reverted");
                        return Ok(None);
                    };
                    let sender = Address::from(lookup.sender);
                    if sender != *to {
                        return Err(SdkError::offchain_error(format!(
                            "lookup sender {sender} does not match contract {to}"
                        )));
                    }
                    debug!(contract = %to, gateways = lookup.urls.len(), "following offchain lookup");
                    let answer = ccip::query_gateways(&self.rpc, &lookup).await?;
                    call = ccip::callback_data(&lookup, answer);
                }
                Err(err) => return Err(err),
            }
        }
        Err(SdkError::offchain_error(format!(
            "contract {to} asked for more than {MAX_OFFCHAIN_HOPS} offchain lookups"
        )))
    }
}
