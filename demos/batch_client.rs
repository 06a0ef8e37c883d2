//! Batched JSON-RPC client example
//!
//! Points at any Ethereum-style JSON-RPC node (default: http://127.0.0.1:8545,
//! override with `RPC_URL`) and shows calls being coalesced into batches.

use jbatch::BatchClient;
use serde_json::json;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());
    println!("Using JSON-RPC endpoint at {}", url);

    let client = BatchClient::builder(url.as_str())
        .time_limit(Duration::from_millis(20))
        .size_limit(100)
        .timeout(Duration::from_secs(10))
        .build()?;

    // Three calls issued together travel in one HTTP request
    let start = Instant::now();
    let (block, gas, chain) = tokio::join!(
        client.send("eth_blockNumber", vec![]),
        client.send("eth_gasPrice", vec![]),
        client.send("eth_chainId", vec![]),
    );
    println!("eth_blockNumber = {}", block?);
    println!("eth_gasPrice    = {}", gas?);
    println!("eth_chainId     = {}", chain?);
    println!("One batch in {:?}\n", start.elapsed());

    // Typed call
    let balance: String = client
        .request(
            "eth_getBalance",
            ("0x0000000000000000000000000000000000000000", "latest"),
        )
        .await?;
    println!("Balance of the zero address: {}", balance);

    // A failing call only fails itself
    let (ok, bad) = tokio::join!(
        client.send("eth_blockNumber", vec![]),
        client.send("no_such_method", vec![json!(1)]),
    );
    println!("eth_blockNumber = {}", ok?);
    match bad {
        Ok(value) => println!("no_such_method unexpectedly returned {}", value),
        Err(e) => println!("no_such_method failed on its own: {}", e),
    }

    // Manual flush skips the time window
    let pending = client.send("net_version", vec![]);
    println!("\nQueued requests before flush: {}", client.pending_count());
    client.flush();
    println!("net_version = {}", pending.await?);

    let network = client.network().await?;
    println!("Network: {} (chain id {})", network.name, network.chain_id);

    Ok(())
}
