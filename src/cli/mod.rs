use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nodebaker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pre-pull container images and download packages for a VHD build
    Cache {
        /// Path to the components manifest JSON
        #[arg(long, env = "COMPONENTS_PATH", default_value = "")]
        components_path: PathBuf,

        /// Log the commands instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Number of image pulls in flight (defaults to the config file)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Container CLI: ctr, crictl, docker or auto
        #[arg(long)]
        cli_tool: Option<String>,
    },

    /// Apply defaults to a ContainerService and print it
    Defaults {
        /// ContainerService JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Default as an upgrade of an existing cluster
        #[arg(long, conflicts_with = "scale")]
        upgrade: bool,

        /// Default as a scale operation
        #[arg(long)]
        scale: bool,
    },

    /// Resolve the bootstrapping configuration of a node
    Bootstrap {
        /// Bootstrap request JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory of override YAML files (defaults to the config file)
        #[arg(long)]
        overrides_dir: Option<PathBuf>,
    },

    /// Print the GPU classification of a VM size
    Gpu {
        /// VM size, e.g. Standard_NC6s_v3
        sku: String,
    },

    /// Resolve the shared image gallery coordinate of a distro
    Sig {
        /// Azure region
        #[arg(long)]
        location: String,

        /// Distro name, e.g. aks-ubuntu-containerd-22.04-gen2
        #[arg(long)]
        distro: String,
    },

    /// Show version information
    Version,
}
