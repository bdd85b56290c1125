use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use aihub_core::{
    config::{Config, DefaultsCfg, HttpCfg, RegistryCfg},
    http_client::HttpClient,
    provider::{Provider, ProviderConfig, ProviderStore},
    registry::{self, HubRegistry, NullSource, PromptSource},
    telemetry::{self, KEY_SPAN_NAME, MetricsEvent, SpanHandle, TraceSink, observe},
};
use clap::{Parser, Subcommand};
use secrecy::SecretString;

#[derive(Parser)]
#[command(author, version, about = "aihub CLI smoke tool", long_about = None)]
struct Cli {
    /// Optional config file (JSON or TOML); built-in defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull a single prompt template by identifier
    Pull {
        #[arg(long)]
        id: String,
    },
    /// Pull every identifier configured under [registry].prompts
    PullAll,
    /// Print the provider store's current record
    ShowConfig,
    /// Replace the provider record wholesale
    Set {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
        #[arg(long, default_value = "")]
        credential: String,
    },
}

/// Forwards span lifecycle events to `tracing` so the fmt subscriber shows them.
#[derive(Default)]
struct LogSink {
    next_id: AtomicU64,
}

impl TraceSink for LogSink {
    fn start_span(&self, name: &str) -> SpanHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(span = id, "{}={}", KEY_SPAN_NAME, name);
        SpanHandle::from_id(id)
    }

    fn record_metrics(&self, span: &SpanHandle, event: MetricsEvent) {
        let attrs = event
            .attributes()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(span = span.id(), "{attrs}");
    }

    fn end_span(&self, span: SpanHandle) {
        tracing::debug!(span = span.id(), "span ended");
    }
}

// Built-in defaults when no config file is given: registry base from the
// environment or a local hub, and the stock prompt identifier list.
fn default_config() -> Config {
    Config {
        registry: RegistryCfg {
            base_url: std::env::var("PROMPT_REGISTRY_BASE")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            api_key_env: "PROMPT_REGISTRY_API_KEY".to_string(),
            prompts: vec![
                "chat-system".to_string(),
                "chat-title".to_string(),
                "chat-summary".to_string(),
            ],
        },
        defaults: DefaultsCfg::default(),
        http: HttpCfg::default(),
    }
}

fn parse_provider(s: &str) -> anyhow::Result<Provider> {
    match s.to_ascii_lowercase().as_str() {
        "openai" => Ok(Provider::OpenAi),
        "anthropic" => Ok(Provider::Anthropic),
        "openrouter" => Ok(Provider::OpenRouter),
        "custom" => Ok(Provider::Custom),
        other => anyhow::bail!(
            "unknown provider '{other}' (expected openai, anthropic, openrouter, or custom)"
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    telemetry::set_trace_sink(std::sync::Arc::new(LogSink::default()));

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => default_config(),
    };

    let store = ProviderStore::from_defaults(&cfg.defaults);

    // No API key in the environment -> canned null source, same fallback the
    // registry itself uses for unknown names.
    let source: Box<dyn PromptSource> = match std::env::var(&cfg.registry.api_key_env) {
        Ok(key) => Box::new(HubRegistry::new(
            HttpClient::from_cfg(&cfg.http)?,
            SecretString::new(key.into()),
            cfg.registry.base_url.clone(),
        )),
        Err(_) => Box::new(NullSource),
    };

    match cli.command {
        Commands::Pull { id } => {
            let template = observe("registry.pull", || source.pull(&id)).await?;
            println!("{} -> {}", template.id, template.template);
            if let Some(version) = template.version {
                eprintln!("[version: {version}]");
            }
        }
        Commands::PullAll => {
            let templates = registry::pull_all(source.as_ref(), &cfg.registry.prompts).await?;
            for template in &templates {
                println!("{} -> {}", template.id, template.template);
            }
        }
        Commands::ShowConfig => {
            // SecretString keeps the credential redacted in Debug output.
            println!("{:?}", store.get());
        }
        Commands::Set {
            provider,
            model,
            credential,
        } => {
            let provider = parse_provider(&provider)?;
            store.set(ProviderConfig {
                provider,
                model,
                credential: SecretString::new(credential.into()),
            });
            println!("{:?}", store.get());
        }
    }

    Ok(())
}
