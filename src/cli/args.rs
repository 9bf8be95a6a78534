//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Organize messy import folders: bulk rename, sort, flatten, and find duplicate media
#[derive(Parser, Debug)]
#[command(name = "import-cleanup")]
#[command(version = "1.0.0")]
#[command(about = "Organize messy import folders: bulk rename, sort, flatten, and find duplicate media", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Preview changes without touching the filesystem
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean up folder names under the configured rules, optionally
    /// renaming each folder's files after the folder
    Rename {
        /// The import folder to process
        folder: PathBuf,

        /// Limit processing to these subfolders (can be given multiple times)
        #[arg(short, long = "subfolder", value_name = "NAME")]
        subfolders: Vec<String>,

        /// Load renaming rules from a JSON preset file
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Save the effective rules as a JSON preset and exit
        #[arg(long, value_name = "FILE")]
        save_rules: Option<PathBuf>,

        /// Rename files to the folder name (overrides config)
        #[arg(long)]
        rename_files: Option<bool>,

        /// Drop this many characters from the start of each name
        #[arg(long)]
        remove_first: Option<usize>,

        /// Drop this many characters from the end of each name
        #[arg(long)]
        remove_last: Option<usize>,

        /// Drop everything up to and including this marker
        #[arg(long, value_name = "MARKER")]
        cut_before: Option<String>,

        /// Drop everything from this marker onwards
        #[arg(long, value_name = "MARKER")]
        cut_after: Option<String>,

        /// Drop all digits
        #[arg(long)]
        remove_digits: Option<bool>,

        /// Drop special characters
        #[arg(long)]
        remove_special: Option<bool>,

        /// Replace underscores with spaces
        #[arg(long)]
        replace_underscores: Option<bool>,

        /// Title Case The Names
        #[arg(long)]
        title_case: Option<bool>,
    },

    /// Sort files into category folders by extension
    Sort {
        /// The folder whose files get sorted
        folder: PathBuf,

        /// Only sort files with this extension
        #[arg(short, long, value_name = "EXT")]
        extension: Option<String>,

        /// Split images per extension instead of one images/ folder
        #[arg(long)]
        separate_images: Option<bool>,

        /// Export into this folder instead of sorting in place
        #[arg(long, value_name = "FOLDER")]
        export_to: Option<PathBuf>,

        /// Copy instead of move (export mode only)
        #[arg(long)]
        copy: bool,
    },

    /// Flatten nested folders and sweep out junk files
    Cleanup {
        /// The folder to clean
        folder: PathBuf,

        /// Limit processing to these subfolders (can be given multiple times)
        #[arg(short, long = "subfolder", value_name = "NAME")]
        subfolders: Vec<String>,

        /// Flatten single-level subfolders (overrides config)
        #[arg(long)]
        flatten: Option<bool>,

        /// Remove empty folders (overrides config)
        #[arg(long)]
        remove_empty: Option<bool>,

        /// Remove temp/cache files (overrides config)
        #[arg(long)]
        remove_temp: Option<bool>,

        /// Remove zero-byte media files (overrides config)
        #[arg(long)]
        remove_zero_byte: Option<bool>,

        /// Also remove files with these extensions (comma-separated)
        #[arg(long, value_name = "EXTS", value_delimiter = ',')]
        extensions: Vec<String>,
    },

    /// Find duplicate files and optionally delete or move them
    Dupes {
        /// The folder to scan
        folder: PathBuf,

        /// Minimum file size in KiB (overrides config)
        #[arg(long, value_name = "KIB")]
        min_size_kb: Option<u64>,

        /// Include subdirectories (overrides config)
        #[arg(short, long)]
        recursive: Option<bool>,

        /// Scan every file, not just media
        #[arg(long)]
        all_files: bool,

        /// Hash algorithm for content comparison
        #[arg(long, value_name = "ALGO", value_parser = ["sha256", "sha512"])]
        algorithm: Option<String>,

        /// What to do with found duplicates
        #[arg(long, value_name = "ACTION", value_parser = ["flag", "delete", "move"], default_value = "flag")]
        action: String,
    },

    /// Open the configuration file in your default editor
    ///
    /// The config file is stored at:
    /// - Windows: %APPDATA%\import_folder_cleanup\config.toml
    /// - Linux/macOS: ~/.config/import_folder_cleanup/config.toml
    ///
    /// If no config file exists, a default one will be created.
    Config {
        /// Show the config file path without opening it
        #[arg(long)]
        path: bool,

        /// Reset config to defaults (creates a fresh config file)
        #[arg(long)]
        reset: bool,
    },

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current configuration
    ShowConfig,
}
