use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use claimcheck_rs::config::PipelineArgs;
use claimcheck_rs::query::build_query;
use claimcheck_rs::report::{Outcome, DEFAULT_MIN_CONFIDENCE};
use claimcheck_rs::retrieve::retrieve_evidence;
use claimcheck_rs::server::{run_server, AppState};
use claimcheck_rs::VerifyError;

#[derive(Parser)]
#[command(name = "claimcheck", version, about = "Check factual claims against web evidence")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Subcommand)]
enum Cmd {
    /// End-to-end: build query -> retrieve evidence -> score
    Run {
        #[arg(required = true)]
        claims: Vec<String>,
        /// Print JSON outcomes instead of the text report
        #[arg(long)]
        json: bool,
        #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
        min_confidence: f32,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Show the search query that would be used for a claim
    Query { claim: String },
    /// Show the evidence a query retrieves
    Retrieve { query: String },
    /// Serve the pipeline over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
        #[arg(long, default_value_t = 4)]
        batch_concurrency: usize,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let args = &cli.pipeline;

    match cli.cmd {
        Cmd::Run { claims, json, min_confidence, concurrency } => {
            let pipeline = args.build_pipeline()?;
            let results = pipeline.verify_many(&claims, concurrency).await;
            let mut failed = 0;
            for res in results {
                if res.is_err() {
                    failed += 1;
                }
                if json {
                    println!("{}", serde_json::to_string(&Outcome::from(res))?);
                    continue;
                }
                match res {
                    Ok(report) => println!("{}", report.render(min_confidence)),
                    Err(err) => eprintln!("verification failed ({}): {err}", err.kind()),
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} of {} claims could not be verified", claims.len());
            }
        }
        Cmd::Query { claim } => {
            if claim.trim().is_empty() {
                return Err(VerifyError::EmptyClaim.into());
            }
            let builder = args.build_query_builder()?;
            let query = build_query(builder.as_ref(), &claim).await?;
            println!("{}", query.text);
        }
        Cmd::Retrieve { query } => {
            let searcher = args.build_searcher()?;
            let evidence = retrieve_evidence(searcher.as_ref(), &query, args.checked_max_results()?).await;
            if evidence.is_empty() {
                println!("No evidence retrieved.");
            }
            for (i, item) in evidence.iter().enumerate() {
                println!("{}. {}\n   {}", i + 1, item.title, item.url);
            }
        }
        Cmd::Serve { addr, batch_concurrency } => {
            let pipeline = args.build_pipeline()?;
            run_server(AppState { pipeline, batch_concurrency }, &addr).await?;
        }
    }
    Ok(())
}
