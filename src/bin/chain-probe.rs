use clap::Parser;
use serde_json::Value;

use protocol_relay::http::{ErrorBody, NegotiationFlags};
use protocol_relay::AggregatedResponse;

#[derive(Parser)]
#[command(name = "chain-probe")]
#[command(about = "Ask the edge which protocols the relay chain negotiated", long_about = None)]
struct Cli {
    /// Edge base URL.
    #[arg(short, long, default_value = "http://localhost:8002")]
    url: String,

    /// Negotiate HTTP/2 on the edge → relay hop.
    #[arg(long)]
    client_http2: bool,

    /// Negotiate HTTP/2 on the relay → origin hop.
    #[arg(long)]
    proxy_http2: bool,

    /// Print the raw JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let flags = NegotiationFlags {
        edge_uses_http2: cli.client_http2,
        relay_uses_http2: cli.proxy_http2,
    };

    let url = format!("{}/?{}", cli.url.trim_end_matches('/'), flags.to_query());
    let res = reqwest::Client::new().get(&url).send().await?;

    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: edge returned status {}", status);
        let text = res.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => eprintln!("{}: {}", body.error, body.message),
            Err(_) => eprintln!("Response: {}", text),
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let aggregated: AggregatedResponse = serde_json::from_value(json)?;
    println!(
        "edge → relay:   {} {}",
        aggregated.response_code, aggregated.response_protocol
    );
    println!("relay observed:  {}", aggregated.relay_observation.request_protocol);
    println!("origin observed: {}", aggregated.origin_observation.request_protocol);
    Ok(())
}
