use anyhow::Context;
use clap::Parser;
use pg_lookup::app::report::{render_candidates, render_outcome};
use pg_lookup::config::cli::{Command, KeysCommand};
use pg_lookup::domain::model::CredentialKind;
use pg_lookup::utils::error::ErrorSeverity;
use pg_lookup::utils::{logger, validation::Validate};
use pg_lookup::{
    AnthropicClient, CliConfig, CountryResolver, FileCredentialStore, JoshuaProjectClient,
    LookupConfig, LookupEngine, LookupError, SearchQuery,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = LookupConfig::load_or_default(cli.config.as_deref())
        .and_then(|config| config.validate().map(|_| config));
    let config = match config {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    let credentials_path = match cli.credentials.clone() {
        Some(path) => path,
        None => match config.credentials_path() {
            Ok(path) => path,
            Err(e) => exit_with(e),
        },
    };
    let store = Arc::new(
        FileCredentialStore::open(&credentials_path).with_context(|| {
            format!(
                "failed to open credential file {}",
                credentials_path.display()
            )
        })?,
    );

    let outcome = match cli.command {
        Command::Keys(keys) => run_keys(&store, keys),
        Command::Candidates(args) => {
            let engine = build_engine(&config, &store)?;
            match SearchQuery::new(&args.name, args.country, None, None) {
                Ok(query) => engine
                    .candidates(&query)
                    .await
                    .and_then(|candidates| render_candidates(&candidates, args.format))
                    .map(|out| println!("{}", out)),
                Err(e) => Err(e),
            }
        }
        Command::Search(args) => {
            if !store.is_complete() {
                tracing::warn!(
                    "API keys are not fully configured ({})",
                    store.path().display()
                );
            }
            let engine = build_engine(&config, &store)?;
            match SearchQuery::new(&args.name, args.country, args.city, args.religion) {
                Ok(query) => engine
                    .run(&query)
                    .await
                    .and_then(|outcome| render_outcome(&outcome, args.format))
                    .map(|out| println!("{}", out)),
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = outcome {
        exit_with(e);
    }
    Ok(())
}

type Engine = LookupEngine<
    JoshuaProjectClient<Arc<FileCredentialStore>>,
    AnthropicClient<Arc<FileCredentialStore>>,
>;

fn build_engine(config: &LookupConfig, store: &Arc<FileCredentialStore>) -> anyhow::Result<Engine> {
    let countries = CountryResolver::with_overrides(&config.countries);
    let source = JoshuaProjectClient::new(config, Arc::clone(store), countries)
        .context("failed to build Joshua Project client")?;
    let model = AnthropicClient::new(config, Arc::clone(store))
        .context("failed to build Anthropic client")?;
    Ok(LookupEngine::new(source, model))
}

fn run_keys(store: &FileCredentialStore, command: KeysCommand) -> pg_lookup::Result<()> {
    match command {
        KeysCommand::Set {
            jp_key,
            anthropic_key,
        } => {
            store.save_all(&jp_key, &anthropic_key)?;
            println!("✅ API keys saved to {}", store.path().display());
        }
        KeysCommand::Clear => {
            store.clear()?;
            println!("🧹 API keys cleared");
        }
        KeysCommand::Status => {
            let snapshot = store.snapshot();
            for kind in CredentialKind::ALL {
                let state = if snapshot.get(kind).is_some() {
                    "set"
                } else {
                    "missing"
                };
                println!("{:<16} {}", kind.service_name(), state);
            }
            println!("File: {}", store.path().display());
        }
    }
    Ok(())
}

fn exit_with(e: LookupError) -> ! {
    tracing::error!(
        "❌ Lookup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,      // no match
        ErrorSeverity::Medium => 2,   // upstream, resubmit
        ErrorSeverity::High => 1,     // input or credentials
        ErrorSeverity::Critical => 3, // local system
    };
    std::process::exit(exit_code);
}
