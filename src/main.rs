use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prepwise_interview::questions::QuestionSetProvider;
use prepwise_interview::{
    create_router, AppState, Config, CredentialResolver, DebugLog, FileCredentialStore,
    GeminiClient, InterviewRequest, QuestionSetClient,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prepwise", about = "PrepWise interview services")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, global = true, default_value = "config/prepwise")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the question generation API
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Request a question set from the configured endpoint and print it
    Questions {
        #[arg(long)]
        role: String,

        #[arg(long, default_value = "")]
        stack: String,

        #[arg(long, default_value_t = 0)]
        years: i32,

        #[arg(long, default_value_t = 5)]
        count: u32,
    },

    /// Manage the saved call provider key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save a key for later sessions
    Set { key: String },
    /// Forget the saved key
    Clear,
    /// Show which key a session would use
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;
    DebugLog::init_global(cfg.debug_log.capacity);

    match cli.command {
        Command::Serve { port } => serve(&cfg, port).await,
        Command::Questions {
            role,
            stack,
            years,
            count,
        } => {
            let request = InterviewRequest::new(role, stack, years).with_question_count(count);
            fetch_questions(&cfg, &request).await
        }
        Command::Key { action } => manage_key(&cfg, action),
    }
}

async fn serve(cfg: &Config, port: Option<u16>) -> Result<()> {
    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let state = match GeminiClient::from_env(&cfg.questions.api_key_env, cfg.questions.gemini_model.clone()) {
        Ok(client) => {
            info!("Question generation using {}", client.model());
            AppState {
                generator: Some(Arc::new(client)),
                api_key_env: cfg.questions.api_key_env.clone(),
            }
        }
        Err(e) => {
            warn!("{}; /api/questions will return errors", e);
            AppState::unconfigured(cfg.questions.api_key_env.clone())
        }
    };

    let addr = format!("{}:{}", cfg.service.http.bind, port.unwrap_or(cfg.service.http.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn fetch_questions(cfg: &Config, request: &InterviewRequest) -> Result<()> {
    let client = QuestionSetClient::new(cfg.questions.endpoint.clone());
    let questions = client
        .generate(request)
        .await
        .context("Question generation failed")?;

    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(())
}

fn manage_key(cfg: &Config, action: KeyAction) -> Result<()> {
    let path = cfg.credentials_path()?;
    let store = Arc::new(FileCredentialStore::new(&path));

    let fallback = Some(cfg.call.fallback_key.clone()).filter(|k| !k.trim().is_empty());
    let resolver = CredentialResolver::from_env(store, &cfg.call.env_key_var, fallback);

    match action {
        KeyAction::Set { key } => {
            resolver.persist(&key)?;
            println!("Key saved to {}", path.display());
        }
        KeyAction::Clear => {
            resolver.clear()?;
            println!("Saved key cleared");
        }
        KeyAction::Show => match resolver.resolve(None) {
            Ok(credential) => println!("{} ({:?})", credential, credential.source()),
            Err(e) => println!("{}", e),
        },
    }

    Ok(())
}
