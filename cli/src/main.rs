use std::process::ExitCode;

use anyhow::{Context, bail};
use fncli_core::{AppConfig, Choice, Operation, Parameter, Registry, ResolvedArguments};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE_VAR: &str = "TOOLBOX_CONFIG_FILE";
const DESCRIPTION: &str = "Sample operations built on fncli";

fn main() -> ExitCode {
    init_tracing();

    match load_config().and_then(|config| Ok((config, registry()?))) {
        Ok((config, registry)) => fncli_engine::run(config, registry),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();
}

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var_os(CONFIG_FILE_VAR) {
        Some(path) => {
            debug!(path = ?path, "loading configuration");
            AppConfig::load(&path)
                .with_context(|| format!("failed to load config from {}", path.to_string_lossy()))
        }
        None => Ok(AppConfig::default().with_description(DESCRIPTION)),
    }
}

fn registry() -> anyhow::Result<Registry> {
    let environments = Choice::new(["dev", "staging", "prod"])?;
    let registry = Registry::new()
        .with_operation(
            Operation::new("function_greet", greet)
                .with_doc("Greets someone by name.")
                .with_param(Parameter::positional("name").with_help("Who to greet"))
                .with_param(Parameter::literal("greeting", "Hello").with_help("Word to greet with")),
        )
        .with_operation(
            Operation::new("function_deploy", deploy)
                .with_doc("Deploys a target to an environment.\n\nThe token is read from the environment or asked for.")
                .with_param(Parameter::positional("target"))
                .with_param(Parameter::choice("env", environments).with_help("Environment"))
                .with_param(Parameter::env_or_ask("token", true).with_help("Access token")),
        )
        .with_operation(
            Operation::new("function_login", login)
                .with_doc("Logs in interactively.")
                .with_param(Parameter::ask("user", false).with_help("User name")),
        )
        .with_operation(
            Operation::new("function_divide", divide)
                .with_doc("Divides two integers.")
                .with_param(Parameter::positional("a"))
                .with_param(Parameter::positional("b")),
        );
    Ok(registry)
}

fn greet(args: &ResolvedArguments) -> anyhow::Result<()> {
    println!("{}, {}!", args.value("greeting")?, args.value("name")?);
    Ok(())
}

fn deploy(args: &ResolvedArguments) -> anyhow::Result<()> {
    let token = args.value("token")?;
    println!("deploying {} to {}", args.value("target")?, args.value("env")?);
    println!("using a token of {} characters", token.chars().count());
    Ok(())
}

fn login(args: &ResolvedArguments) -> anyhow::Result<()> {
    println!("logged in as {}", args.value("user")?);
    Ok(())
}

fn divide(args: &ResolvedArguments) -> anyhow::Result<()> {
    let a: i64 = args.parse("a")?;
    let b: i64 = args.parse("b")?;
    if b == 0 {
        bail!("division by zero");
    }
    println!("{}", a / b);
    Ok(())
}
