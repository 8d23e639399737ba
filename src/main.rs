use anyhow::{Context, Result};
use clap::Parser;
use polyscribe::capability::openai::OpenAiCapability;
use polyscribe::cli::{Cli, Commands};
use polyscribe::config::Config;
use polyscribe::dispatch::CapabilitySet;
use polyscribe::document::DocumentStore;
use polyscribe::job::{JobQueue, JobStatus};
use polyscribe::pipeline::{self, PipelineContext, PipelineOutput};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Transcribe { ref file, ref name } => {
            let ctx = build_context(&config)?;
            let source_name = name.clone().unwrap_or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| file.display().to_string())
            });
            let file = file.clone();
            let output = run_job(cli.quiet, async move {
                pipeline::run_transcription(&ctx, &file, &source_name).await
            })
            .await?;
            print_output(&output, cli.quiet);
        }
        Commands::Reformat { ref document } => {
            let ctx = build_context(&config)?;
            let text = ctx.store.primary_content(document)?;
            let document = document.clone();
            let output = run_job(cli.quiet, async move {
                pipeline::run_reformat(&ctx, &text, &document).await
            })
            .await?;
            print_output(&output, cli.quiet);
        }
        Commands::Translate {
            ref document,
            ref language,
        } => {
            let ctx = build_context(&config)?;
            let text = ctx.store.primary_content(document)?;
            let language = language
                .clone()
                .unwrap_or_else(|| config.pipeline.target_language.clone());
            let document = document.clone();
            let output = run_job(cli.quiet, async move {
                pipeline::run_translation(&ctx, &text, &document, &language).await
            })
            .await?;
            print_output(&output, cli.quiet);
        }
        Commands::List => {
            let store = DocumentStore::new(config.storage.documents_dir());
            let entries = store.list()?;
            if entries.is_empty() {
                eprintln!("No documents stored yet.");
            }
            for entry in entries {
                println!(
                    "{}\t{}\t{}",
                    entry.filename, entry.source_name, entry.created_at
                );
            }
        }
        Commands::Show { ref document } => {
            let store = DocumentStore::new(config.storage.documents_dir());
            let text = store.read(document)?;
            println!("{text}");
        }
        Commands::Config => {
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{rendered}");
        }
    }

    Ok(())
}

/// Submits one pipeline run through the job substrate and polls it to a
/// terminal status, the way an HTTP caller would.
async fn run_job<Fut>(quiet: bool, work: Fut) -> Result<PipelineOutput>
where
    Fut: Future<Output = polyscribe::error::Result<PipelineOutput>> + Send + 'static,
{
    let queue = JobQueue::new();
    let job_id = queue.submit(work).await;
    if !quiet {
        eprintln!("Job {job_id} submitted, processing...");
    }

    let status = queue
        .wait(&job_id, Duration::from_millis(250))
        .await
        .context("job vanished from the queue")?;

    match status {
        JobStatus::Completed { text, saved_to } => Ok(PipelineOutput {
            text,
            document: saved_to,
        }),
        JobStatus::Failed { error } => anyhow::bail!("job failed: {error}"),
        JobStatus::Processing => unreachable!("wait() only returns terminal statuses"),
    }
}

fn print_output(output: &PipelineOutput, quiet: bool) {
    println!("{}", output.text);
    if !quiet && let Some(document) = &output.document {
        eprintln!("Saved to {document}");
    }
}

fn build_context(config: &Config) -> Result<PipelineContext> {
    let api = Arc::new(OpenAiCapability::new(&config.capability)?);
    Ok(PipelineContext {
        settings: config.pipeline.clone(),
        capabilities: Arc::new(CapabilitySet {
            transcriber: api.clone(),
            generator: api,
            temperature: config.capability.temperature,
        }),
        store: DocumentStore::new(config.storage.documents_dir()),
        temp_dir: config.storage.temp_dir(),
    })
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(&Config::default_path())
            .context("Failed to load default config")?,
    };
    Ok(config.with_env_overrides())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "polyscribe=warn",
        1 => "polyscribe=info",
        _ => "polyscribe=debug",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
