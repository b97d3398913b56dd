//! Avatar record parsing.
//!
//! An ENS `avatar` text record may hold an HTTP(S) URL, a data URI, an
//! IPFS/IPNS/Arweave URI, a bare IPFS CID, or a CAIP-22/29 reference to an
//! NFT (`eip155:1/erc721:0xabc.../1234`). Everything except NFTs maps
//! straight to a fetchable URL; NFTs need chain calls, see
//! [`crate::EnsClient::avatar`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use enslookup_types::Address;
use serde::Deserialize;

/// Gateways used to turn content-addressed URIs into HTTP URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarGateways {
    pub ipfs: String,
    pub arweave: String,
}

impl Default for AvatarGateways {
    fn default() -> Self {
        Self {
            ipfs: "https://ipfs.io".to_string(),
            arweave: "https://arweave.net".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NftStandard {
    Erc721,
    Erc1155,
}

/// A token reference parsed from an `eip155:` avatar record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftRef {
    pub chain_id: u64,
    pub standard: NftStandard,
    pub contract: Address,
    pub token_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarUri {
    Http(String),
    Data(String),
    Ipfs(String),
    Ipns(String),
    Arweave(String),
    Nft(NftRef),
}

fn looks_like_cid(value: &str) -> bool {
    let head = value.split('/').next().unwrap_or_default();
    (head.starts_with("Qm") && head.len() == 46)
        || (head.starts_with("bafy") && head.len() > 50 && head.bytes().all(|b| b.is_ascii_alphanumeric()))
}

fn parse_nft(reference: &str) -> Option<NftRef> {
    // eip155:<chain>/<standard>:<contract>/<token>
    let rest = reference.strip_prefix("eip155:")?;
    let (chain, rest) = rest.split_once('/')?;
    let (standard, rest) = rest.split_once(':')?;
    let (contract, token_id) = rest.split_once('/')?;

    let standard = match standard.to_lowercase().as_str() {
        "erc721" => NftStandard::Erc721,
        "erc1155" => NftStandard::Erc1155,
        _ => return None,
    };
    if token_id.is_empty() {
        return None;
    }

    Some(NftRef {
        chain_id: chain.parse().ok()?,
        standard,
        contract: contract.parse().ok()?,
        token_id: token_id.to_string(),
    })
}

impl AvatarUri {
    /// Classify a raw avatar record. Unrecognized values yield `None`.
    pub fn parse(record: &str) -> Option<Self> {
        let record = record.trim();
        if record.is_empty() {
            return None;
        }

        let lower = record.to_lowercase();
        if lower.starts_with("https://") || lower.starts_with("http://") {
            return Some(AvatarUri::Http(record.to_string()));
        }
        if lower.starts_with("data:") {
            return Some(AvatarUri::Data(record.to_string()));
        }
        if let Some(path) = record.strip_prefix("ipfs://") {
            let path = path.strip_prefix("ipfs/").unwrap_or(path);
            return Some(AvatarUri::Ipfs(path.to_string()));
        }
        if let Some(path) = record.strip_prefix("/ipfs/") {
            return Some(AvatarUri::Ipfs(path.to_string()));
        }
        if let Some(path) = record.strip_prefix("ipns://") {
            return Some(AvatarUri::Ipns(path.to_string()));
        }
        if let Some(id) = record.strip_prefix("ar://") {
            return Some(AvatarUri::Arweave(id.to_string()));
        }
        if lower.starts_with("eip155:") {
            return parse_nft(record).map(AvatarUri::Nft);
        }
        if looks_like_cid(record) {
            return Some(AvatarUri::Ipfs(record.to_string()));
        }
        None
    }

    /// HTTP (or data) URL for this URI, or `None` for NFT references.
    pub fn gateway_url(&self, gateways: &AvatarGateways) -> Option<String> {
        let ipfs = gateways.ipfs.trim_end_matches('/');
        match self {
            AvatarUri::Http(url) | AvatarUri::Data(url) => Some(url.clone()),
            AvatarUri::Ipfs(path) => Some(format!("{ipfs}/ipfs/{path}")),
            AvatarUri::Ipns(path) => Some(format!("{ipfs}/ipns/{path}")),
            AvatarUri::Arweave(id) => Some(format!(
                "{}/{id}",
                gateways.arweave.trim_end_matches('/')
            )),
            AvatarUri::Nft(_) => None,
        }
    }
}

/// The fields of ERC-721/ERC-1155 metadata that can carry an image.
#[derive(Debug, Default, Deserialize)]
pub struct NftMetadata {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_data: Option<String>,
}

impl NftMetadata {
    /// The image URI, preferring `image`, then `image_url`, then inline SVG.
    pub fn image_uri(&self) -> Option<String> {
        let linked = [&self.image, &self.image_url]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty());
        if let Some(uri) = linked {
            return Some(uri.to_string());
        }
        self.image_data
            .as_deref()
            .filter(|svg| !svg.trim().is_empty())
            .map(|svg| format!("data:image/svg+xml;base64,{}", BASE64.encode(svg.as_bytes())))
    }
}

/// Substitute the ERC-1155 `{id}` placeholder with the 64-digit hex token id.
pub fn expand_erc1155_uri(uri: &str, token_id: &[u8; 32]) -> String {
    uri.replace("{id}", &hex::encode(token_id))
}

/// Decode a `data:application/json` URI in place, without a network fetch.
///
/// Returns `None` when `uri` is not a JSON data URI.
pub fn decode_json_data_uri(uri: &str) -> Option<Result<NftMetadata, String>> {
    let rest = uri.strip_prefix("data:application/json")?;
    let (params, payload) = rest.split_once(',')?;
    let bytes = if params.ends_with(";base64") {
        match BASE64.decode(payload.trim()) {
            Ok(bytes) => bytes,
            Err(err) => return Some(Err(format!("invalid base64 metadata: {err}"))),
        }
    } else {
        payload.as_bytes().to_vec()
    };
    Some(serde_json::from_slice(&bytes).map_err(|err| format!("invalid metadata json: {err}")))
}
