use std::collections::BTreeMap;

use clap::{Args, Parser, Subcommand};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use serde_json::json;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send a request through a running CORS relay", long_about = None)]
struct Cli {
    /// Base URL of the relay.
    #[arg(short, long, default_value = "http://localhost:8080")]
    relay: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode the target as query parameters on a GET
    Get(TargetArgs),
    /// Encode the target as a JSON payload on a POST
    Post(TargetArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Absolute http(s) URL of the target.
    url: String,

    /// Method used for the outbound request.
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Outbound request body.
    #[arg(short, long)]
    body: Option<String>,

    /// Outbound header as `Name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Named header preset to apply.
    #[arg(short, long)]
    preset: Option<String>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{}`", raw))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Get(target) => {
            let headers: BTreeMap<_, _> = target.headers.into_iter().collect();
            // The relay decodes url, body, headers and preset once more
            // after the query string itself is decoded.
            let mut query = vec![
                ("url", component(&target.url)),
                ("method", target.method),
                ("headers", component(&serde_json::to_string(&headers)?)),
            ];
            if let Some(body) = target.body {
                query.push(("body", component(&body)));
            }
            if let Some(preset) = target.preset {
                query.push(("preset", component(&preset)));
            }
            client.get(&cli.relay).query(&query).send().await?
        }
        Commands::Post(target) => {
            let headers: BTreeMap<_, _> = target.headers.into_iter().collect();
            let payload = json!({
                "url": target.url,
                "method": target.method,
                "body": target.body,
                "headers": headers,
                "preset": target.preset,
            });
            client.post(&cli.relay).json(&payload).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let content_type = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    eprintln!("{} ({})", status, content_type);
    println!("{}", text);
    Ok(())
}
