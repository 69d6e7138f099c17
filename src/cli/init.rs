//! Init command implementation
//!
//! Scaffolds a working directory for deepr: a commented `deepr.toml`, a
//! `.env.example` with the two keys a run needs, and a `.gitignore`.

use super::output::Output;
use crate::utils::toml_config::{CONFIG_TEMPLATE, DEFAULT_CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// deepr.toml already exists and --force was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
#[derive(Debug, Clone)]
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing deepr");

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = write_file(&config_path, CONFIG_TEMPLATE, config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, ENV_EXAMPLE, config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("env", ".env.example");
    }

    let gitignore_path = base_path.join(".gitignore");
    if gitignore_path.exists() {
        output.skipped(".gitignore", "already exists");
    } else if let Err(e) = write_file(&gitignore_path, GITIGNORE, false) {
        output.warning(&format!("Failed to create .gitignore: {}", e));
    } else {
        output.created("file", ".gitignore");
    }

    output.success("deepr initialized");

    output.header("Next Steps");
    output.info("1. Add your API keys:");
    output.command("cp .env.example .env");
    output.info("2. Run a research topic:");
    output.command("deepr research \"latest developments in AI\" --save");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

const ENV_EXAMPLE: &str = r#"# Model provider key (name configurable via [llm] api_key_env)
OPENAI_API_KEY=

# Firecrawl deep research key
FIRECRAWL_API_KEY=

# Log filter, overrides [logging] level
# RUST_LOG=deepr=debug
"#;

const GITIGNORE: &str = r#".env
*_report.md
"#;
