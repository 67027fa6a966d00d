//! # Commands Module
//!
//! Command handlers, one per dashboard tab
//!
//! ## Key Components
//! - [`handle_overview_command`] - Monthly engagement per media account
//! - [`handle_hashtags_command`] - Hashtag ranking
//! - [`handle_video_length_command`] - Engagement by video length
//! - [`handle_songs_command`] - Engagement per song
//! - [`handle_video_posting_command`] - Posting time heatmap

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;

use crate::cli::{Metric, SelectionArgs, SortOrder};
use crate::config::{resolve_data_path, DashboardConfig};
use crate::csv_loader::{get_media_list, load_rows};
use crate::dashboards::{
    build_hashtags, build_overview, build_songs, build_video_length, build_video_posting,
    FilterState,
};
use crate::datetime::parse_date_arg;
use crate::models::Record;
use crate::table_display::{
    format_hashtags_table, format_heatmap_table, format_overview_table, format_songs_table,
    format_video_length_table,
};

fn load_dataset(data: Option<&str>) -> Result<Vec<Record>> {
    let path = resolve_data_path(data);
    let report = load_rows(&path)
        .with_context(|| format!("Failed to load dataset from {}", path.display()))?;

    if report.skipped > 0 {
        warn!("{} malformed CSV rows were skipped", report.skipped);
    }
    if report.rows.is_empty() {
        anyhow::bail!(
            "No posts found in {}. Point --data or VIDSTATS_DATA at the exported dataset.",
            path.display()
        );
    }

    Ok(report.rows)
}

fn build_state(selection: &SelectionArgs, metric: Metric, config: &DashboardConfig) -> Result<FilterState> {
    let since = selection.since.as_deref().map(parse_date_arg).transpose()?;
    let until = selection.until.as_deref().map(parse_date_arg).transpose()?;
    let date_range = config.date_range_with(since, until);

    if date_range.start > date_range.end {
        anyhow::bail!(
            "--since ({}) must not be after --until ({})",
            date_range.start,
            date_range.end
        );
    }

    Ok(FilterState::new(date_range, metric).with_media(selection.media.clone()))
}

fn print_view<T: Serialize>(view: &T, json: bool, format_table: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!("{}", format_table(view));
    }
    Ok(())
}

/// Handle the monthly overview command
pub fn handle_overview_command(data: Option<&str>, selection: &SelectionArgs, metric: Metric) -> Result<()> {
    let config = DashboardConfig::default();
    let rows = load_dataset(data)?;
    let state = build_state(selection, metric, &config)?;

    if state.media.is_empty() && !selection.json {
        println!("No media selected. Pick one or more with --media:");
        for media in get_media_list(&rows) {
            println!("  {}", media);
        }
        return Ok(());
    }

    let view = build_overview(&rows, &state, &config);
    if view.rows.is_empty() && !selection.json {
        println!("No data found for the specified date range.");
        return Ok(());
    }
    print_view(&view, selection.json, format_overview_table)
}

/// Handle the hashtag ranking command
pub fn handle_hashtags_command(
    data: Option<&str>,
    selection: &SelectionArgs,
    metric: Metric,
    top: Option<usize>,
) -> Result<()> {
    let config = DashboardConfig::default();
    let rows = load_dataset(data)?;
    let mut state = build_state(selection, metric, &config)?;
    state.top = top;

    let view = build_hashtags(&rows, &state, &config);
    if view.hashtags.is_empty() && !selection.json {
        println!("No hashtags found for the specified date range.");
        return Ok(());
    }
    print_view(&view, selection.json, format_hashtags_table)
}

/// Handle the video length command
pub fn handle_video_length_command(data: Option<&str>, selection: &SelectionArgs, metric: Metric) -> Result<()> {
    let config = DashboardConfig::default();
    let rows = load_dataset(data)?;
    let state = build_state(selection, metric, &config)?;

    let view = build_video_length(&rows, &state, &config);
    print_view(&view, selection.json, format_video_length_table)
}

/// Handle the songs command
pub fn handle_songs_command(
    data: Option<&str>,
    selection: &SelectionArgs,
    metric: Metric,
    order: SortOrder,
    top: Option<usize>,
) -> Result<()> {
    let config = DashboardConfig::default();
    let rows = load_dataset(data)?;
    let mut state = build_state(selection, metric, &config)?;
    state.order = order;
    state.top = top;

    let view = build_songs(&rows, &state);
    if view.songs.is_empty() && !selection.json {
        println!("No songs found for the specified date range.");
        return Ok(());
    }
    print_view(&view, selection.json, format_songs_table)
}

/// Handle the posting time heatmap command
pub fn handle_video_posting_command(
    data: Option<&str>,
    selection: &SelectionArgs,
    metric: Metric,
    weekly: bool,
    block_hours: Option<u32>,
) -> Result<()> {
    let mut config = DashboardConfig::default();
    if let Some(hours) = block_hours {
        if hours == 0 || hours > 24 {
            anyhow::bail!("--block-hours must be between 1 and 24, got: {}", hours);
        }
        config.block_hours = hours;
    }

    let rows = load_dataset(data)?;
    let mut state = build_state(selection, metric, &config)?;
    state.weekly = weekly;

    let view = build_video_posting(&rows, &state, &config);
    print_view(&view, selection.json, format_heatmap_table)
}
