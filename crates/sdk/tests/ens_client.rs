use alloy_primitives::{Bytes, FixedBytes, U256};
use alloy_sol_types::{SolCall, SolError};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use enslookup_sdk::ccip::callback_data;
use enslookup_sdk::contracts::{
    EnsRegistry, Erc721, ExtendedResolver, OffchainLookup, PublicResolver,
};
use enslookup_sdk::{EnsClient, RpcClient, SdkError, ENS_REGISTRY, EXTENDED_RESOLVER_INTERFACE};
use enslookup_types::{namehash, Address, EnsName};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

enum Reply {
    Data(Vec<u8>),
    Revert,
    RevertWith(Vec<u8>),
    Error(i64, &'static str),
}

/// In-process JSON-RPC node answering `eth_call` from a fixed table, plus an
/// offchain lookup gateway keyed by request data.
/// Unknown calls return a zero word.
#[derive(Default)]
struct FakeNode {
    calls: HashMap<(Address, Vec<u8>), Reply>,
    gateway: HashMap<String, Vec<u8>>,
}

impl FakeNode {
    fn reply(&mut self, to: Address, data: Vec<u8>, reply: Reply) {
        self.calls.insert((to, data), reply);
    }

    fn set_resolver(&mut self, name: &str, resolver: Address) {
        let data = EnsRegistry::resolverCall {
            node: namehash(name).into(),
        }
        .abi_encode();
        self.reply(ENS_REGISTRY, data, Reply::Data(encode_address(resolver)));
    }

    fn set_addr(&mut self, resolver: Address, name: &str, address: Address) {
        self.reply(resolver, addr_call(name), Reply::Data(encode_address(address)));
    }

    fn set_text(&mut self, resolver: Address, name: &str, key: &str, value: &str) {
        self.reply(
            resolver,
            text_call(name, key),
            Reply::Data(encode_value(&value.to_string())),
        );
    }

    fn set_reverse(&mut self, resolver: Address, address: Address, name: &str) {
        let reverse = EnsName::reverse(&address);
        self.set_resolver(reverse.as_str(), resolver);
        self.reply(
            resolver,
            PublicResolver::nameCall {
                node: reverse.namehash().into(),
            }
            .abi_encode(),
            Reply::Data(encode_value(&name.to_string())),
        );
    }

    /// Make `call` on `resolver` revert into an offchain lookup whose gateway
    /// answer leads the callback to return `result`.
    fn set_offchain(
        &mut self,
        resolver: Address,
        call: Vec<u8>,
        lookup: &OffchainLookup,
        answer: &[u8],
        result: Vec<u8>,
    ) {
        self.reply(resolver, call, Reply::RevertWith(lookup.abi_encode()));
        self.gateway.insert(
            format!("0x{}", hex::encode(&lookup.callData)),
            answer.to_vec(),
        );
        self.reply(
            resolver,
            callback_data(lookup, answer.to_vec()),
            Reply::Data(result),
        );
    }
}

fn addr_call(name: &str) -> Vec<u8> {
    PublicResolver::addrCall {
        node: namehash(name).into(),
    }
    .abi_encode()
}

fn text_call(name: &str, key: &str) -> Vec<u8> {
    PublicResolver::textCall {
        node: namehash(name).into(),
        key: key.into(),
    }
    .abi_encode()
}

fn encode_value<T: alloy_sol_types::SolValue>(value: &T) -> Vec<u8> {
    value.abi_encode()
}

fn encode_address(address: Address) -> Vec<u8> {
    encode_value(&alloy_primitives::Address::from(address))
}

fn addr(byte: u8) -> Address {
    Address([byte; 20])
}

fn offchain_lookup(sender: Address, urls: Vec<String>) -> OffchainLookup {
    OffchainLookup {
        sender: sender.into(),
        urls,
        callData: Bytes::from(vec![0xca, 0xfe]),
        callbackFunction: FixedBytes([0x12, 0x34, 0x56, 0x78]),
        extraData: Bytes::from(vec![0x01]),
    }
}

async fn handle_rpc(State(node): State<Arc<FakeNode>>, Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let call = &req["params"][0];
    let to: Address = call["to"].as_str().unwrap().parse().unwrap();
    let data = hex::decode(call["data"].as_str().unwrap().trim_start_matches("0x")).unwrap();

    let mut body = match node.calls.get(&(to, data)) {
        Some(Reply::Data(ret)) => json!({ "result": format!("0x{}", hex::encode(ret)) }),
        Some(Reply::Revert) => json!({ "error": { "code": 3, "message": "execution reverted" } }),
        Some(Reply::RevertWith(data)) => json!({
            "error": {
                "code": 3,
                "message": "execution reverted",
                "data": format!("0x{}", hex::encode(data)),
            }
        }),
        Some(Reply::Error(code, message)) => json!({ "error": { "code": code, "message": message } }),
        None => json!({ "result": format!("0x{}", "00".repeat(32)) }),
    };
    body["jsonrpc"] = json!("2.0");
    body["id"] = id;
    Json(body)
}

async fn handle_metadata(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "name": format!("token {id}"), "image": "ar://nft-image" }))
}

fn gateway_answer(node: &FakeNode, data: &str) -> Result<Json<Value>, StatusCode> {
    node.gateway
        .get(data)
        .map(|answer| Json(json!({ "data": format!("0x{}", hex::encode(answer)) })))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn handle_gateway_get(
    State(node): State<Arc<FakeNode>>,
    Path((_sender, data)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    gateway_answer(&node, &data)
}

async fn handle_gateway_post(
    State(node): State<Arc<FakeNode>>,
    Json(req): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    gateway_answer(&node, req["data"].as_str().unwrap_or_default())
}

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn serve(listener: TcpListener, node: FakeNode) {
    let app = Router::new()
        .route("/", post(handle_rpc))
        .route("/meta/:id", get(handle_metadata))
        .route("/gateway/:sender/:data", get(handle_gateway_get))
        .route("/gateway", post(handle_gateway_post))
        .with_state(Arc::new(node));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

fn client(addr: SocketAddr) -> EnsClient {
    EnsClient::new(RpcClient::new(format!("http://{addr}/")).unwrap())
}

async fn start(node: FakeNode) -> EnsClient {
    let (listener, addr) = bind().await;
    serve(listener, node);
    client(addr)
}

#[tokio::test]
async fn resolves_forward_address() {
    let resolver = addr(0xaa);
    let owner = addr(0x11);
    let mut node = FakeNode::default();
    node.set_resolver("vitalik.eth", resolver);
    node.set_addr(resolver, "vitalik.eth", owner);

    let client = start(node).await;
    let name = EnsName::parse("Vitalik.eth").unwrap();
    assert_eq!(client.resolve_address(&name).await.unwrap(), Some(owner));
}

#[tokio::test]
async fn unregistered_name_is_absent() {
    let client = start(FakeNode::default()).await;
    let name = EnsName::parse("nobody-owns-this.eth").unwrap();
    assert_eq!(client.resolver(&name).await.unwrap(), None);
    assert_eq!(client.resolve_address(&name).await.unwrap(), None);
    assert_eq!(client.text(&name, "url").await.unwrap(), None);
}

#[tokio::test]
async fn zero_address_record_is_absent() {
    let resolver = addr(0xaa);
    let mut node = FakeNode::default();
    node.set_resolver("empty.eth", resolver);
    node.set_addr(resolver, "empty.eth", Address::ZERO);

    let client = start(node).await;
    let name = EnsName::parse("empty.eth").unwrap();
    assert_eq!(client.resolve_address(&name).await.unwrap(), None);
}

#[tokio::test]
async fn reverse_resolution_requires_forward_match() {
    let resolver = addr(0xaa);
    let honest = addr(0x11);
    let spoofer = addr(0x22);
    let mut node = FakeNode::default();
    node.set_resolver("alice.eth", resolver);
    node.set_addr(resolver, "alice.eth", honest);
    node.set_reverse(resolver, honest, "alice.eth");
    node.set_reverse(resolver, spoofer, "alice.eth");

    let client = start(node).await;
    assert_eq!(
        client.lookup_address(&honest).await.unwrap(),
        Some(EnsName::parse("alice.eth").unwrap())
    );
    assert_eq!(client.lookup_address(&spoofer).await.unwrap(), None);
    assert_eq!(client.lookup_address(&addr(0x33)).await.unwrap(), None);
}

#[tokio::test]
async fn wildcard_resolution_through_parent() {
    let resolver = addr(0xbb);
    let owner = addr(0x44);
    let name = EnsName::parse("sub.foo.eth").unwrap();
    let mut node = FakeNode::default();
    node.set_resolver("foo.eth", resolver);
    node.reply(
        resolver,
        ExtendedResolver::supportsInterfaceCall {
            interfaceID: EXTENDED_RESOLVER_INTERFACE.into(),
        }
        .abi_encode(),
        Reply::Data(encode_value(&true)),
    );
    node.reply(
        resolver,
        ExtendedResolver::resolveCall {
            name: name.dns_encode().into(),
            data: addr_call("sub.foo.eth").into(),
        }
        .abi_encode(),
        Reply::Data(encode_value(&Bytes::from(encode_address(owner)))),
    );

    let client = start(node).await;
    let found = client.resolver(&name).await.unwrap().unwrap();
    assert_eq!(found.address, resolver);
    assert!(!found.exact);
    assert_eq!(client.resolve_address(&name).await.unwrap(), Some(owner));
}

#[tokio::test]
async fn parent_resolver_without_wildcard_support_is_absent() {
    let resolver = addr(0xbb);
    let mut node = FakeNode::default();
    node.set_resolver("foo.eth", resolver);

    let client = start(node).await;
    let name = EnsName::parse("sub.foo.eth").unwrap();
    assert_eq!(client.resolve_address(&name).await.unwrap(), None);
}

#[tokio::test]
async fn reverted_or_empty_text_is_absent() {
    let resolver = addr(0xaa);
    let mut node = FakeNode::default();
    node.set_resolver("alice.eth", resolver);
    node.set_text(resolver, "alice.eth", "com.twitter", "alice");
    node.set_text(resolver, "alice.eth", "email", "");
    node.reply(resolver, text_call("alice.eth", "url"), Reply::Revert);

    let client = start(node).await;
    let name = EnsName::parse("alice.eth").unwrap();
    assert_eq!(
        client.text(&name, "com.twitter").await.unwrap().as_deref(),
        Some("alice")
    );
    assert_eq!(client.text(&name, "email").await.unwrap(), None);
    assert_eq!(client.text(&name, "url").await.unwrap(), None);
}

#[tokio::test]
async fn node_failure_is_an_error() {
    let resolver = addr(0xaa);
    let mut node = FakeNode::default();
    node.set_resolver("alice.eth", resolver);
    node.reply(
        resolver,
        addr_call("alice.eth"),
        Reply::Error(-32000, "header not found"),
    );

    let client = start(node).await;
    let name = EnsName::parse("alice.eth").unwrap();
    let err = client.resolve_address(&name).await.unwrap_err();
    assert!(matches!(err, SdkError::Rpc { code: -32000, .. }), "{err}");
    assert!(!err.is_revert());
}

#[tokio::test]
async fn unreachable_node_is_an_error() {
    let (listener, addr) = bind().await;
    drop(listener);

    let name = EnsName::parse("alice.eth").unwrap();
    let err = client(addr).resolve_address(&name).await.unwrap_err();
    assert!(matches!(err, SdkError::Http(_)), "{err}");
}

#[tokio::test]
async fn avatar_uses_gateway_for_ipfs_records() {
    let resolver = addr(0xaa);
    let mut node = FakeNode::default();
    node.set_resolver("alice.eth", resolver);
    node.set_text(resolver, "alice.eth", "avatar", "ipfs://QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG");

    let client = start(node).await;
    let name = EnsName::parse("alice.eth").unwrap();
    assert_eq!(
        client.avatar(&name).await.unwrap().as_deref(),
        Some("https://ipfs.io/ipfs/QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG")
    );
}

#[tokio::test]
async fn nft_avatar_follows_token_metadata() {
    let (listener, socket) = bind().await;
    let resolver = addr(0xaa);
    let collection = addr(0xcc);
    let mut node = FakeNode::default();
    node.set_resolver("alice.eth", resolver);
    node.set_text(
        resolver,
        "alice.eth",
        "avatar",
        &format!("eip155:1/erc721:{collection}/7"),
    );
    node.reply(
        collection,
        Erc721::tokenURICall {
            tokenId: U256::from(7u64),
        }
        .abi_encode(),
        Reply::Data(encode_value(&format!("http://{socket}/meta/7"))),
    );
    serve(listener, node);

    let client = client(socket);
    let name = EnsName::parse("alice.eth").unwrap();
    assert_eq!(
        client.avatar(&name).await.unwrap().as_deref(),
        Some("https://arweave.net/nft-image")
    );
}

#[tokio::test]
async fn nft_avatar_on_other_chain_is_absent() {
    let resolver = addr(0xaa);
    let mut node = FakeNode::default();
    node.set_resolver("alice.eth", resolver);
    node.set_text(
        resolver,
        "alice.eth",
        "avatar",
        &format!("eip155:137/erc721:{}/7", addr(0xcc)),
    );

    let client = start(node).await;
    let name = EnsName::parse("alice.eth").unwrap();
    assert_eq!(client.avatar(&name).await.unwrap(), None);
}

#[tokio::test]
async fn offchain_resolver_answers_through_gateway() {
    let (listener, socket) = bind().await;
    let resolver = addr(0xdd);
    let owner = addr(0x55);
    let lookup = offchain_lookup(
        resolver,
        vec![
            format!("http://{socket}/missing/{{sender}}/{{data}}"),
            format!("http://{socket}/gateway/{{sender}}/{{data}}"),
        ],
    );
    let mut node = FakeNode::default();
    node.set_resolver("offchain.eth", resolver);
    node.set_offchain(
        resolver,
        addr_call("offchain.eth"),
        &lookup,
        b"signed answer",
        encode_address(owner),
    );
    serve(listener, node);

    let name = EnsName::parse("offchain.eth").unwrap();
    assert_eq!(
        client(socket).resolve_address(&name).await.unwrap(),
        Some(owner)
    );
}

#[tokio::test]
async fn offchain_gateway_without_data_template_is_posted() {
    let (listener, socket) = bind().await;
    let resolver = addr(0xdd);
    let lookup = offchain_lookup(resolver, vec![format!("http://{socket}/gateway")]);
    let mut node = FakeNode::default();
    node.set_resolver("offchain.eth", resolver);
    node.set_offchain(
        resolver,
        text_call("offchain.eth", "url"),
        &lookup,
        b"signed answer",
        encode_value(&"https://offchain.example".to_string()),
    );
    serve(listener, node);

    let name = EnsName::parse("offchain.eth").unwrap();
    assert_eq!(
        client(socket).text(&name, "url").await.unwrap().as_deref(),
        Some("https://offchain.example")
    );
}

#[tokio::test]
async fn failing_gateways_are_an_error() {
    let (listener, socket) = bind().await;
    let resolver = addr(0xdd);
    let lookup = offchain_lookup(
        resolver,
        vec![format!("http://{socket}/missing/{{sender}}/{{data}}")],
    );
    let mut node = FakeNode::default();
    node.set_resolver("offchain.eth", resolver);
    node.reply(
        resolver,
        addr_call("offchain.eth"),
        Reply::RevertWith(lookup.abi_encode()),
    );
    serve(listener, node);

    let name = EnsName::parse("offchain.eth").unwrap();
    let err = client(socket).resolve_address(&name).await.unwrap_err();
    assert!(matches!(err, SdkError::OffchainLookup(_)), "{err}");
}

#[tokio::test]
async fn offchain_lookup_from_other_sender_is_rejected() {
    let resolver = addr(0xdd);
    let lookup = offchain_lookup(addr(0xee), vec!["http://127.0.0.1:9/{data}".to_string()]);
    let mut node = FakeNode::default();
    node.set_resolver("offchain.eth", resolver);
    node.reply(
        resolver,
        addr_call("offchain.eth"),
        Reply::RevertWith(lookup.abi_encode()),
    );

    let client = start(node).await;
    let name = EnsName::parse("offchain.eth").unwrap();
    let err = client.resolve_address(&name).await.unwrap_err();
    assert!(
        matches!(&err, SdkError::OffchainLookup(message) if message.contains("does not match")),
        "{err}"
    );
}
