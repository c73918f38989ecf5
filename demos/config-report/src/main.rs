//! Binds a sample service configuration from the environment and an optional
//! YAML/JSON file, then prints the resolved values.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use confbind::{
    BindSources, Binder, ConfigSource, ConfigType, Configuration, FieldDescriptor, FieldSet,
    Format, SourceLoader, Value,
};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "config-report", about = "Resolve and print the demo service configuration")]
struct Cli {
    /// Configuration file supplying the `database` section.
    #[arg(long)]
    file: Option<PathBuf>,

    /// File format (`yaml` or `json`); inferred from the extension when omitted.
    #[arg(long, requires = "file")]
    format: Option<String>,

    /// Print the field reference instead of resolving values.
    #[arg(long)]
    describe: bool,
}

#[derive(Debug, Deserialize)]
struct ServiceConfig {
    name: String,
    port: u16,
    debug: bool,
    database: Option<DatabaseConfig>,
}

impl Configuration for ServiceConfig {
    fn describe(fields: &mut FieldSet) {
        fields
            .register(
                "name",
                FieldDescriptor::env("APP_NAME")
                    .string()
                    .with_default("config-report")
                    .with_description("Service name reported in logs"),
            )
            .register(
                "port",
                FieldDescriptor::env("APP_PORT")
                    .number()
                    .with_default(8080)
                    .with_fallible_validator(|v| match v.as_u64() {
                        Some(1..=65535) => Ok(true),
                        _ => Err(format!("{v} is not a valid port")),
                    })
                    .with_description("HTTP listen port"),
            )
            .register(
                "debug",
                FieldDescriptor::env("APP_DEBUG")
                    .boolean()
                    .with_default(false)
                    .with_description("Enable debug endpoints"),
            )
            .register(
                "database",
                FieldDescriptor::prop()
                    .nested::<DatabaseConfig>()
                    .with_required(false)
                    .with_description("Database settings, read from the configuration file"),
            );
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct DatabaseConfig {
    url: String,
    pool_size: u32,
}

impl Configuration for DatabaseConfig {
    fn describe(fields: &mut FieldSet) {
        fields
            .register(
                "url",
                FieldDescriptor::prop()
                    .string()
                    .with_validator(|v| v.as_str().is_some_and(|s| s.contains("://")))
                    .with_description("Connection URL"),
            )
            .register(
                "pool_size",
                FieldDescriptor::prop()
                    .with_name("pool-size")
                    .number()
                    .with_default(4)
                    .with_description("Connection pool size"),
            );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let binder = Binder::new();
    let ty = ConfigType::of::<ServiceConfig>();

    if cli.describe {
        let docs = binder.registry().documentation(ty);
        println!("{}", serde_json::to_string_pretty(&docs)?);
        return Ok(());
    }

    let mut sources = BindSources::env(SourceLoader::environment());
    if let Some(path) = cli.file {
        let source = match cli.format.as_deref() {
            Some(format) => ConfigSource::file(path).with_format(format.parse::<Format>()?),
            None => ConfigSource::detect(path)?,
        };
        let data = SourceLoader::new()
            .load_file(&source)
            .with_context(|| format!("loading {source}"))?;
        sources = sources.with_file(data);
    }

    let instance = binder.bind_sources(ty, &sources)?;
    let config: ServiceConfig = instance.deserialize()?;
    info!(
        name = %config.name,
        port = config.port,
        debug = config.debug,
        database = config.database.is_some(),
        "configuration resolved"
    );

    let rendered: Value = instance.to_value();
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}
