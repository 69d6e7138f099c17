use anyhow::Context;
use deepr::{
    cli::{
        init::{self, InitConfig, InitResult},
        output::{ConsoleSink, Output},
        report_filename, Cli, Commands,
    },
    llm::LLMClientFactory,
    research::FirecrawlClientFactory,
    types::{mask_secret, AppError, FIRECRAWL_API_KEY_ENV},
    utils::toml_config::{DeeprConfig, LoggingConfig},
    workflows::Orchestrator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Options for `deepr research`
struct ResearchArgs {
    topic: String,
    output_path: Option<PathBuf>,
    save: bool,
    show_initial: bool,
    json: bool,
    fail_fast: bool,
    openai_key: Option<String>,
    firecrawl_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let loaded = DeeprConfig::load_or_default(&cli.config);
    let logging = match &loaded {
        Ok(config) => config.logging.clone(),
        Err(_) => LoggingConfig::default(),
    };
    init_tracing(&logging, cli.verbose);
    if loaded.is_ok() && !matches!(cli.command, Commands::Init { .. }) {
        log_config_source(&cli.config);
    }

    match cli.command {
        Commands::Init { path, force } => {
            match init::run(InitConfig { path, force }, &output) {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => anyhow::bail!("Initialization failed: {}", e),
            }
        }
        Commands::Config { validate } => {
            let config = loaded.with_context(|| format!("Failed to load {}", cli.config.display()))?;
            show_config(&config, &cli.config, validate, &output)
        }
        Commands::Research {
            topic,
            output: output_path,
            save,
            show_initial,
            json,
            fail_fast,
            openai_key,
            firecrawl_key,
        } => {
            let config = loaded.with_context(|| format!("Failed to load {}", cli.config.display()))?;
            let args = ResearchArgs {
                topic,
                output_path,
                save,
                show_initial,
                json,
                fail_fast,
                openai_key,
                firecrawl_key,
            };
            research(&config, args, &output).await
        }
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries the report.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn log_config_source(path: &Path) {
    if path.exists() {
        tracing::info!(path = %path.display(), "loaded configuration");
    } else {
        tracing::warn!(path = %path.display(), "configuration file not found, using defaults");
    }
}

async fn research(config: &DeeprConfig, args: ResearchArgs, output: &Output) -> anyhow::Result<()> {
    let credentials = config.credentials(args.openai_key.as_deref(), args.firecrawl_key.as_deref());

    let llm_factory = LLMClientFactory::new(config.llm.api_base.as_str(), config.llm.model.as_str())
        .with_temperature(config.llm.temperature);
    let research_factory = FirecrawlClientFactory::new(config.firecrawl.api_base.as_str());
    let sink = ConsoleSink::new(*output).with_initial_report(args.show_initial);

    let orchestrator = Orchestrator::new(Arc::new(llm_factory), Arc::new(research_factory))
        .with_sink(Arc::new(sink))
        .with_fail_fast(args.fail_fast || config.research.fail_fast);

    output.banner();
    output.kv("Topic", args.topic.trim());
    output.kv("Model", &config.llm.model);

    let run = match orchestrator.run(&args.topic, &credentials).await {
        Ok(run) => run,
        Err(e) => {
            if matches!(e, AppError::Configuration(_)) {
                output.hint(&format!(
                    "Set {} and {} (or a .env file), pass --openai-key/--firecrawl-key, \
                     or add them to [credentials] in deepr.toml",
                    config.llm.api_key_env, FIRECRAWL_API_KEY_ENV
                ));
            }
            return Err(e.into());
        }
    };

    if !run.research.succeeded {
        output.warning("The report was written without deep research findings");
    }

    if args.json {
        let json = serde_json::to_string_pretty(&run).context("Failed to serialize run output")?;
        output.report(&json);
    } else {
        output.report(&run.final_report);
    }

    let save_path = args
        .output_path
        .or_else(|| args.save.then(|| PathBuf::from(report_filename(&run.topic))));
    if let Some(path) = save_path {
        std::fs::write(&path, &run.final_report)
            .map_err(AppError::from)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        output.created("report", &path.display().to_string());
    }

    Ok(())
}

fn show_config(
    config: &DeeprConfig,
    path: &Path,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    output.header("Configuration");
    output.kv("File", &path.display().to_string());
    if !path.exists() {
        output.warning("File not found, showing defaults");
    }

    output.header("LLM");
    output.kv("API base", &config.llm.api_base);
    output.kv("Model", &config.llm.model);
    output.kv("Key variable", &config.llm.api_key_env);
    output.kv(
        "Temperature",
        &config
            .llm
            .temperature
            .map(|t| t.to_string())
            .unwrap_or_else(|| "provider default".to_string()),
    );

    output.header("Research");
    output.kv("Firecrawl API base", &config.firecrawl.api_base);
    output.kv("Fail fast", &config.research.fail_fast.to_string());

    output.header("Logging");
    output.kv("Level", &config.logging.level);
    output.kv("JSON", &config.logging.json.to_string());

    output.header("Credentials");
    let credentials = config.credentials(None, None);
    let describe = |key: Option<&str>| key.map(mask_secret).unwrap_or_else(|| "not set".to_string());
    output.kv("Model provider key", &describe(credentials.model_api_key()));
    output.kv(
        "Firecrawl key",
        &describe(credentials.research_api_key().as_deref()),
    );

    if validate {
        output.header("Validation");
        match config.validate_with_warnings() {
            Ok(warnings) => {
                for warning in &warnings {
                    output.warning(&warning.to_string());
                }
                output.success("Configuration is valid");
            }
            Err(e) => {
                output.error(&e.to_string());
                return Err(e).context("Configuration is invalid");
            }
        }
    }

    Ok(())
}
