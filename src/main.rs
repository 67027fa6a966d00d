//! # Video Engagement Statistics
//!
//! Grouping, bucketing and ranking of short-video engagement per media account
//!
//! ## Key Components
//! - [`dashboards`] - One pipeline per dashboard tab
//! - [`aggregation`] - Composite-key group-by shared by every pipeline
//! - [`commands`] - CLI handlers printing tables or JSON

mod aggregation;
mod cli;
mod commands;
mod config;
mod csv_loader;
mod dashboards;
mod data_processing;
mod datetime;
mod filtering;
mod grid;
mod hashtags;
mod intervals;
mod models;
mod table_display;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Args, Commands};
use crate::commands::{
    handle_hashtags_command, handle_overview_command, handle_songs_command,
    handle_video_length_command, handle_video_posting_command,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger based on debug flag
    if args.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    }

    let data = args.data.as_deref();
    match &args.command {
        Commands::Overview { selection, metric } => {
            handle_overview_command(data, selection, *metric)
        }
        Commands::Hashtags {
            selection,
            metric,
            top,
        } => handle_hashtags_command(data, selection, *metric, *top),
        Commands::VideoLength { selection, metric } => {
            handle_video_length_command(data, selection, *metric)
        }
        Commands::Songs {
            selection,
            metric,
            order,
            top,
        } => handle_songs_command(data, selection, *metric, *order, *top),
        Commands::VideoPosting {
            selection,
            metric,
            weekly,
            block_hours,
        } => handle_video_posting_command(data, selection, *metric, *weekly, *block_hours),
    }
}
