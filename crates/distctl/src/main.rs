use anyhow::Context;
use clap::{Parser, Subcommand};
use distribution_core::api::{CreateDistributionResponse, ErrorResponse, DISTRIBUTIONS_PATH};
use distribution_core::model::DistributionRequest;

#[derive(Parser, Debug)]
#[command(name = "distctl", about = "Client for the distribution daemon")]
struct Args {
    /// Daemon base URL.
    #[arg(long, global = true, default_value = "http://127.0.0.1:3000")]
    daemon: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a distribution from flags.
    Create {
        #[arg(long)]
        case_id: String,
        /// "All States", "Selected", or any other scope.
        #[arg(long)]
        scope: Option<String>,
        /// Attachment reference; repeat for several.
        #[arg(long = "attachment")]
        attachments: Vec<String>,
    },
    /// Post a JSON request body read from a file.
    Send {
        #[arg(long)]
        file: String,
    },
    /// Check that the daemon is up.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();
    let base = args.daemon.trim_end_matches('/');

    match args.cmd {
        Cmd::Create {
            case_id,
            scope,
            attachments,
        } => {
            let req = DistributionRequest::new(
                case_id,
                scope.as_deref(),
                attachments.into_iter().map(serde_json::Value::String).collect(),
            );
            let body = serde_json::to_value(&req)?;
            post_create(&client, base, &body).await?;
        }
        Cmd::Send { file } => {
            let bytes = tokio::fs::read(&file).await.with_context(|| format!("read {file}"))?;
            let body: serde_json::Value = serde_json::from_slice(&bytes).context("parse json")?;
            post_create(&client, base, &body).await?;
        }
        Cmd::Health => {
            let text = client
                .get(format!("{base}/healthz"))
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            println!("{text}");
        }
    }

    Ok(())
}

async fn post_create(client: &reqwest::Client, base: &str, body: &serde_json::Value) -> anyhow::Result<()> {
    let resp = client
        .post(format!("{base}{DISTRIBUTIONS_PATH}"))
        .json(body)
        .send()
        .await
        .with_context(|| format!("POST {base}{DISTRIBUTIONS_PATH}"))?;

    let status = resp.status();
    if status.is_client_error() {
        let err: ErrorResponse = resp.json().await.context("decode error body")?;
        anyhow::bail!("{status}: {} ({})", err.message, err.error);
    }

    let out: CreateDistributionResponse = resp.error_for_status()?.json().await?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
