use enslookup_sdk::{EnsClient, RpcClient};
use enslookup_types::{EnsName, TextKey};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rpc_url = std::env::var("ENSLOOKUP_RPC_URL")
        .unwrap_or_else(|_| "https://eth-mainnet.g.alchemy.com/v2/demo".to_string());
    let raw = std::env::args().nth(1).unwrap_or_else(|| "vitalik.eth".to_string());

    let client = EnsClient::new(RpcClient::new(rpc_url)?);
    let name = EnsName::parse(&raw)?;

    match client.resolve_address(&name).await? {
        Some(address) => println!("{name} -> {address}"),
        None => println!("{name} has no address record"),
    }
    if let Some(avatar) = client.avatar(&name).await? {
        println!("avatar: {avatar}");
    }
    for key in TextKey::ALL {
        if let Some(value) = client.text(&name, key.key()).await? {
            println!("{}: {value}", key.label());
        }
    }
    Ok(())
}
