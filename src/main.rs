use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use nodebaker::{
    bootstrap::{BootstrapResolver, NodeBootstrappingRequest},
    cacher::{Cacher, Host},
    cli::{Cli, Commands},
    cloud::CloudSpecRegistry,
    components::Components,
    config::{CacherConfig, Config},
    datamodel::ContainerService,
    defaults::{DefaultsParams, Defaulter},
    distro::Distro,
    exec::{Backend, DryRunBackend, SubprocessBackend},
    overrides::{read_from_dir, Overrides},
    sig, sku,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Cache {
            components_path,
            dry_run,
            parallelism,
            cli_tool,
        } => {
            let config = Config::load()?;
            let cacher_config = CacherConfig {
                components_path,
                parallelism: parallelism.unwrap_or(config.cacher.parallelism),
                cli_tool: cli_tool.unwrap_or(config.cacher.cli_tool),
                dry_run,
            };
            cache(cacher_config).await?;
        }
        Commands::Defaults {
            input,
            upgrade,
            scale,
        } => {
            let cs: ContainerService = read_json(&input)?;
            let params = DefaultsParams {
                is_upgrade: upgrade,
                is_scale: scale,
            };
            let clouds = CloudSpecRegistry::new();
            let cs = Defaulter::new(&clouds)
                .set_properties_defaults(cs, params)
                .await?;
            print_json(&cs)?;
        }
        Commands::Bootstrap {
            input,
            overrides_dir,
        } => {
            let config = Config::load()?;
            let request: NodeBootstrappingRequest = read_json(&input)?;
            let overrides = load_overrides(overrides_dir.or(config.bootstrap.overrides_dir))?;
            let clouds = CloudSpecRegistry::new();
            let resolver = BootstrapResolver::new(&clouds, config.sig.sig_config(), overrides)?;
            let resolved = resolver.resolve(request).await?;
            print_json(&resolved)?;
        }
        Commands::Gpu { sku } => {
            print_json(&sku::GpuProfile::for_sku(&sku))?;
        }
        Commands::Sig { location, distro } => {
            let config = Config::load()?;
            let distro: Distro = distro.parse().map_err(|e: String| anyhow!(e))?;
            let image = sig::resolve(distro, &config.sig.sig_config(), &location)?;
            print_json(&image)?;
        }
        Commands::Version => {
            println!("nodebaker {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

async fn cache(config: CacherConfig) -> Result<()> {
    config.validate()?;
    let tool = config.resolve_cli_tool()?;
    let components = Components::load(&config.components_path)
        .with_context(|| format!("Failed to load {}", config.components_path.display()))?;

    let backend: Arc<dyn Backend> = if config.dry_run {
        Arc::new(DryRunBackend::new())
    } else {
        Arc::new(SubprocessBackend)
    };
    let host = Host::detect();
    info!(
        os = %host.os,
        arch = %host.arch,
        tool = %tool,
        parallelism = config.parallelism,
        dry_run = config.dry_run,
        "starting component cache"
    );
    let cacher = Cacher::new(tool, config.parallelism, backend, host).await?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, waiting for in-flight commands to finish");
            on_signal.cancel();
        }
    });

    if let Err(e) = cacher.cache(&components, &cancel).await {
        let failures = e.constituents();
        for failure in &failures {
            error!("{}", failure);
        }
        bail!("caching components failed with {} error(s)", failures.len());
    }
    Ok(())
}

fn load_overrides(dir: Option<PathBuf>) -> Result<Overrides> {
    match dir {
        Some(dir) => read_from_dir(&dir)
            .with_context(|| format!("Failed to load overrides from {}", dir.display())),
        None => Ok(Overrides::new()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
