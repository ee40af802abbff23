//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ftcache - Cached file transform pipelines.
#[derive(Debug, Parser)]
#[command(name = "ftcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .ftcache.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Transform the given files
    Transform(TransformArgs),

    /// Transform every file matching a glob pattern
    Glob(GlobArgs),

    /// List cached entries
    List(ListArgs),
}

/// Arguments for the `transform` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TransformArgs {
    /// Files to transform
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Write outputs under this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for the `glob` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GlobArgs {
    /// Pattern, relative to the project root
    pub pattern: String,

    /// Match files and directories starting with a dot
    #[arg(long)]
    pub dot: bool,

    /// Write outputs under this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
