use anyhow::{Context, Result};
use campus_config::{CampusConfig, ConfigLoader};
use campus_rbac::{
    preset_actor, preset_scopes, Authorizer, Decision, DenyReason, GrantReason, Requirement, Role,
    RoleSwitcher, Session,
};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod cli;
use cli::{Cli, Commands, ConfigCommands, OutputFormat};

/// Load configuration from file or environment
fn load_config(config_path: Option<&PathBuf>) -> Result<CampusConfig> {
    let loader = ConfigLoader::new();
    match config_path {
        Some(path) => loader
            .from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => loader
            .from_env()
            .context("Failed to load configuration from environment"),
    }
}

/// Human-readable summary of a decision
fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Granted(GrantReason::SuperScope) => "granted (super-scope)".to_string(),
        Decision::Granted(GrantReason::AllScopesHeld) => "granted (all scopes held)".to_string(),
        Decision::Granted(GrantReason::EmptyRequirement) => {
            "granted (nothing required)".to_string()
        }
        Decision::Denied(DenyReason::NoActor) => "denied (not signed in)".to_string(),
        Decision::Denied(DenyReason::MissingScopes(missing)) => {
            let tokens: Vec<&str> = missing.iter().map(|scope| scope.as_str()).collect();
            format!("denied (missing {})", tokens.join(", "))
        }
        Decision::Denied(DenyReason::UnknownScopes(unknown)) => {
            format!("denied (unknown {})", unknown.join(", "))
        }
        Decision::Denied(DenyReason::EmptyRequirement) => {
            "denied (empty requirement)".to_string()
        }
    }
}

fn print_decision(label: &str, decision: &Decision) {
    let summary = describe(decision);
    if decision.is_granted() {
        println!("{}: {}", label, summary.green());
    } else {
        println!("{}: {}", label, summary.red());
    }
}

fn build_authorizer(config: &CampusConfig, session: Arc<Session>) -> Result<Authorizer> {
    Authorizer::builder()
        .identity(session)
        .config(&config.rbac)
        .build()
        .context("Failed to build authorizer")
}

/// Handle `check`
fn handle_check(config: &CampusConfig, role: Role, require: &[String]) -> Result<()> {
    let session = Arc::new(Session::with_actor(preset_actor(role)));
    let authorizer = build_authorizer(config, session)?;

    let decision = authorizer.check(Requirement::from_tokens(require));
    print_decision(role.as_str(), &decision);
    Ok(())
}

/// Handle `switch`
fn handle_switch(config: &CampusConfig, from: Role, to: Role, require: &[String]) -> Result<()> {
    let session = Arc::new(Session::new());
    let switcher = RoleSwitcher::new(session.clone());
    let authorizer = build_authorizer(config, session)?;
    let requirement = Requirement::from_tokens(require);

    switcher.switch_to(from);
    print_decision(from.as_str(), &authorizer.check(requirement.clone()));

    switcher.switch_to(to);
    print_decision(to.as_str(), &authorizer.check(requirement));
    Ok(())
}

/// Handle `registry`
fn handle_registry(config: &CampusConfig, format: OutputFormat) -> Result<()> {
    let registry = config
        .rbac
        .load_registry()
        .context("Failed to load role registry")?;
    let report = registry.report();

    let output = match format {
        OutputFormat::Yaml => report.to_yaml(),
        OutputFormat::Json => report.to_json(),
    }
    .context("Failed to serialize registry report")?;

    println!("{}", output);
    Ok(())
}

/// Handle `parity`
fn handle_parity(config: &CampusConfig, role: Option<Role>) -> Result<()> {
    let registry = config
        .rbac
        .load_registry()
        .context("Failed to load role registry")?;

    let roles: Vec<Role> = match role {
        Some(role) => vec![role],
        None => Role::ALL.to_vec(),
    };

    let mut divergent = 0;
    for role in roles {
        let report = registry.parity(role, &preset_scopes(role));
        if report.is_consistent() {
            println!("{}: {}", role.as_str(), "consistent".green());
            continue;
        }

        divergent += 1;
        println!("{}: {}", role.as_str(), "divergent".yellow());
        for scope in &report.registry_only {
            println!("  registry only: {}", scope);
        }
        for scope in &report.granted_only {
            println!("  granted only:  {}", scope);
        }
    }

    info!(divergent, "Parity report complete");
    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match load_config(Some(config_file)) {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {:#}", e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &PathBuf, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    fs::write(output, CampusConfig::generate_sample())
        .context("Failed to write configuration file")?;

    println!("✅ Configuration generated at: {:?}", output);
    println!(
        "🔧 Validate with: campus-authz config validate --config-file {:?}",
        output
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    campus_logging::init_logging_from_config(&config.logging)?;

    match &cli.command {
        Some(Commands::Check { role, require }) => handle_check(&config, *role, require),
        Some(Commands::Switch { from, to, require }) => {
            handle_switch(&config, *from, *to, require)
        }
        Some(Commands::Registry { format }) => handle_registry(&config, *format),
        Some(Commands::Parity { role }) => handle_parity(&config, *role),
        Some(Commands::Config { config_cmd }) => match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
        },
        None => {
            // If no subcommand is provided, print help
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_rbac::Scope;

    #[test]
    fn test_describe_decisions() {
        assert_eq!(
            describe(&Decision::Granted(GrantReason::SuperScope)),
            "granted (super-scope)"
        );
        assert_eq!(
            describe(&Decision::Denied(DenyReason::MissingScopes(vec![
                Scope::LmsWrite,
                Scope::FinanceRead
            ]))),
            "denied (missing lms:write, finance:read)"
        );
        assert_eq!(
            describe(&Decision::Denied(DenyReason::UnknownScopes(vec![
                "fees:write".to_string()
            ]))),
            "denied (unknown fees:write)"
        );
    }

    #[test]
    fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("campus.yaml");

        handle_config_generate(&path, false).unwrap();
        assert!(handle_config_generate(&path, false).is_err());
        handle_config_generate(&path, true).unwrap();

        let config = ConfigLoader::new().from_file(&path).unwrap();
        assert!(config.rbac.super_scope.is_some());
    }

    #[test]
    fn test_missing_config_file_fails_validation() {
        let path = PathBuf::from("/nonexistent/campus.yaml");
        assert!(handle_config_validate(&path).is_err());
    }
}
