//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// hubsync - Keep hub configuration and external services aligned with
/// a locally authored desired state
#[derive(Parser, Debug)]
#[command(name = "hubsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sync hub devices and areas into the inventory tracker
    ///
    /// Runs two passes: areas become tracker locations, then devices
    /// become inventory items placed in those locations.
    Devices {
        /// Hub device registry snapshot (JSON list)
        #[arg(long, env = "HUBSYNC_DEVICES")]
        devices: PathBuf,

        /// Hub area registry snapshot (JSON list)
        #[arg(long, env = "HUBSYNC_AREAS")]
        areas: PathBuf,

        /// Tracker inventory snapshot (JSON list, written back)
        #[arg(long, env = "HUBSYNC_ITEMS")]
        items: PathBuf,

        /// Tracker locations snapshot (JSON list, written back)
        #[arg(long, env = "HUBSYNC_LOCATIONS")]
        locations: PathBuf,

        /// Deny rules for virtual and system devices (TOML)
        #[arg(long, env = "HUBSYNC_RULES")]
        rules: Option<PathBuf>,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Update every matched item, in sync or not
        #[arg(long)]
        force_update: bool,
    },

    /// Sync listening progress to the audiobook server
    Audiobooks {
        /// Seller library export (JSON, flat list or wrapped)
        #[arg(long, env = "HUBSYNC_LIBRARY")]
        library: PathBuf,

        /// Audiobook shelf snapshot (JSON list, written back)
        #[arg(long, env = "HUBSYNC_SHELF")]
        shelf: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Update every matched book, in sync or not
        #[arg(long)]
        force_update: bool,
    },

    /// Sync assistant exposure flags into the entity registry
    Exposure {
        /// Exposure map (YAML: entity id to flag)
        #[arg(long, env = "HUBSYNC_EXPOSURE")]
        config: PathBuf,

        /// Entity registry snapshot (JSON document, written back)
        #[arg(long, env = "HUBSYNC_REGISTRY")]
        registry: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Update every managed entity, in sync or not
        #[arg(long)]
        force_update: bool,
    },

    /// Sync HomeKit bridge filter lists into the config entries
    Homekit {
        /// Desired filter lists (YAML)
        #[arg(long, env = "HUBSYNC_HOMEKIT")]
        config: PathBuf,

        /// Config entries snapshot (JSON document, written back)
        #[arg(long, env = "HUBSYNC_ENTRIES")]
        entries: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Rewrite the filter even when the lists already match
        #[arg(long)]
        force_update: bool,
    },

    /// Update scenes in the server document from local files
    Scenes {
        /// Local scene files (single YAML document each)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Server scenes document (YAML list, written back)
        #[arg(long, env = "HUBSYNC_SCENES")]
        server: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Rewrite every matched scene, in sync or not
        #[arg(long)]
        force_update: bool,
    },

    /// Update automations in the server document from local files
    Automations {
        /// Local automation files (single YAML document each)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Server automations document (YAML list, written back)
        #[arg(long, env = "HUBSYNC_AUTOMATIONS")]
        server: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Rewrite every matched automation, in sync or not
        #[arg(long)]
        force_update: bool,
    },
}
