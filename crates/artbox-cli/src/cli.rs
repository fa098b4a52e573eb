//! Command-line interface for the artbox utility
//!
//! One subcommand per tool; defaults match the library option structs.

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use artbox::core::logging::init_logging;
use artbox::svg::{fix_svg_tree, DEFAULT_VECTOR_DIR};
use artbox::tools::{
    self, CollageOptions, InkscapeCommand, SheetOptions, ThumbsOptions, TwitterifyOptions,
    UpdateOptions,
};
use artbox::{BatchReport, Size};

/// Artbox - maintenance tools for an artwork repository
#[derive(Parser)]
#[command(name = "artbox")]
#[command(about = "Collages, thumbnails, sprite sheets and SVG cleanup for artwork repositories")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lay out every image of a directory in a grid
    Collage {
        /// Directory to scan recursively
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Images per row
        #[arg(long, default_value_t = 8)]
        columns: usize,

        /// Cell size in pixels
        #[arg(long, default_value_t = 128)]
        cell: u32,

        /// Skip images smaller than this on either side
        #[arg(long, default_value_t = 64)]
        min_side: u32,

        /// Output image (.png or .jpg)
        #[arg(short, long, default_value = "collage.jpg")]
        output: PathBuf,

        /// Place images in random order instead of path order
        #[arg(long)]
        shuffle: bool,
    },

    /// Write JPEG thumbnails mirroring a directory tree
    Thumbs {
        /// Directory to scan recursively
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Long side of each thumbnail in pixels
        #[arg(long, default_value_t = 128)]
        cell: u32,

        /// Output directory
        #[arg(short, long, default_value = ".thumb")]
        output: PathBuf,
    },

    /// Split an Aseprite sprite sheet into one PNG per tag
    SplitSheet {
        /// Sheet image
        sheet: PathBuf,

        /// Atlas JSON exported next to the sheet
        atlas: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Keep transparency (pass `false` to flatten onto white)
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        transparent: bool,

        /// File name prefix
        #[arg(long, default_value = "gopher")]
        prefix: String,
    },

    /// Give fully transparent pixels one background color
    NormalizeAlpha {
        /// Glob of PNG files, e.g. "art/**/*.png"
        pattern: String,
    },

    /// Flatten single-stop gradients and prune dead definitions
    FixSvgStyle {
        /// Directory to scan recursively
        #[arg(default_value = DEFAULT_VECTOR_DIR)]
        dir: PathBuf,
    },

    /// Pad a PNG or GIF to a minimum canvas
    Twitterify {
        /// Input .png or .gif
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Minimum width
        #[arg(long, default_value_t = 506)]
        width: u32,

        /// Minimum height
        #[arg(long, default_value_t = 128)]
        height: u32,

        /// How many times GIF frames are repeated
        #[arg(long, default_value_t = 3)]
        repeat: usize,

        /// Keep the padding transparent
        #[arg(long)]
        transparent: bool,

        /// Duplicate every GIF frame at half delay
        #[arg(long)]
        duplicate: bool,

        /// Override frame delay, in centiseconds
        #[arg(long, default_value_t = 0)]
        duration: u32,
    },

    /// Regenerate gallery thumbnails and README.md
    Update {
        /// Gallery root containing vector/ and sketch/
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// File whose content replaces the README header
        #[arg(long)]
        header: Option<PathBuf>,

        /// Add a title above every folder
        #[arg(long)]
        titles: bool,

        /// One collage per sketch folder instead of thumbnails
        #[arg(long)]
        sketch_collages: bool,

        /// Program used to export SVG thumbnails
        #[arg(long, default_value = "inkscape")]
        inkscape: PathBuf,
    },

    /// Show available tools
    Tools {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Main CLI application
#[derive(Default)]
pub struct ArtboxApp;

impl ArtboxApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("ARTBOX_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("ARTBOX_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Artbox v{}", env!("CARGO_PKG_VERSION"));
        }

        self.dispatch(cli.command, cli.verbose)
    }

    fn dispatch(&mut self, command: Commands, verbose: bool) -> Result<()> {
        match command {
            Commands::Collage {
                dir,
                columns,
                cell,
                min_side,
                output,
                shuffle,
            } => {
                let options = CollageOptions {
                    columns,
                    cell,
                    min_side,
                    output,
                    shuffle,
                };
                let collage = tools::make_collage(&dir, &options)?;
                if verbose {
                    eprintln!("Placed {} images", collage.links.len());
                }
                println!("{}", collage.output.display());
                Ok(())
            }
            Commands::Thumbs { dir, cell, output } => {
                let report = tools::make_thumbs(&dir, &ThumbsOptions { cell, output })?;
                Self::finish(report, verbose)
            }
            Commands::SplitSheet {
                sheet,
                atlas,
                out,
                transparent,
                prefix,
            } => {
                let options = SheetOptions {
                    transparent,
                    prefix,
                };
                for path in tools::split_sheet(&sheet, &atlas, &out, &options)? {
                    println!("{}", path.display());
                }
                Ok(())
            }
            Commands::NormalizeAlpha { pattern } => {
                Self::finish(tools::normalize_alpha(&pattern)?, verbose)
            }
            Commands::FixSvgStyle { dir } => Self::finish(fix_svg_tree(&dir)?, verbose),
            Commands::Twitterify {
                input,
                output,
                width,
                height,
                repeat,
                transparent,
                duplicate,
                duration,
            } => {
                let options = TwitterifyOptions {
                    min_size: Size::new(width, height),
                    repeat,
                    transparent,
                    duplicate,
                    duration,
                };
                tools::twitterify(&input, &output, &options)?;
                println!("{}", output.display());
                Ok(())
            }
            Commands::Update {
                root,
                header,
                titles,
                sketch_collages,
                inkscape,
            } => {
                let mut options = UpdateOptions {
                    root,
                    with_titles: titles,
                    sketch_collages,
                    ..UpdateOptions::default()
                };
                if let Some(header) = header {
                    options.header = fs::read_to_string(&header)
                        .with_context(|| format!("Failed to read header {}", header.display()))?;
                }
                let rasterizer = InkscapeCommand { program: inkscape };
                let readme = tools::update_readme(&options, &rasterizer)?;
                println!("{}", readme.display());
                Ok(())
            }
            Commands::Tools { json } => self.tools_command(json, verbose),
        }
    }

    /// Print the summary of a batch; any failed file is an error
    fn finish(report: BatchReport, verbose: bool) -> Result<()> {
        if verbose {
            for path in &report.written {
                eprintln!("wrote {}", path.display());
            }
        }
        println!("{}", report);

        if report.is_success() {
            Ok(())
        } else {
            Err(anyhow!("{} file(s) failed", report.failures.len()))
        }
    }

    /// Handle the tools command
    fn tools_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing available tools");
        }

        let catalog = tools::catalog();
        if json {
            let listing = serde_json::json!({
                "tools": catalog,
                "total": catalog.len(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Available tools:");
            for tool in catalog {
                println!("  {:<16} - {}", tool.name, tool.description);
            }
            println!();
            println!("Total: {} tools", catalog.len());
        }

        Ok(())
    }
}
