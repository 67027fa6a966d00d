//! # Table Display Module
//!
//! Terminal tables for each dashboard view
//!
//! ## Key Components
//! - [`format_overview_table`] - Monthly totals per media account
//! - [`format_hashtags_table`] - Hashtag ranking
//! - [`format_video_length_table`] - Duration buckets
//! - [`format_songs_table`] - Song ranking with metric weights
//! - [`format_heatmap_table`] - Time block × day grid
//! - [`format_number_compact`] - Compact number formatting for table cells

use crate::dashboards::{HashtagsView, OverviewView, SongsView, VideoLengthView, VideoPostingView};
use crate::datetime::DAYS_OF_WEEK;
use crate::models::{self, Record};

const GRAY: &str = "\x1b[90m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[39m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    header: &'static str,
    width: usize,
    align: Align,
}

impl Column {
    const fn left(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Left,
        }
    }

    const fn right(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Right,
        }
    }
}

pub fn format_number_compact(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.0}K", n / 1_000.0)
    } else if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{:.2}", n)
    }
}

fn compact_cell(row: &Record, column: &str) -> String {
    row.get_f64(column)
        .map(format_number_compact)
        .unwrap_or_default()
}

/// Cut to `width` characters, marking the cut with an ellipsis
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn banner(title: &str) -> String {
    let inner = title.chars().count() + 4;
    let bar = "─".repeat(inner);
    let blank = " ".repeat(inner);
    format!("\n ╭{bar}╮\n │{blank}│\n │  {title}  │\n │{blank}│\n ╰{bar}╯\n\n")
}

fn border(columns: &[Column], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = columns.iter().map(|c| "─".repeat(c.width + 2)).collect();
    format!(
        "{GRAY}{left}{}{right}{RESET}\n",
        segments.join(&mid.to_string())
    )
}

fn line(columns: &[Column], cells: &[String], color: Option<&str>) -> String {
    let mut output = format!("{GRAY}│{RESET}");
    for (column, cell) in columns.iter().zip(cells) {
        let cell = fit(cell, column.width);
        let padded = match column.align {
            Align::Left => format!(" {:<width$} ", cell, width = column.width),
            Align::Right => format!(" {:>width$} ", cell, width = column.width),
        };
        match color {
            Some(color) => output.push_str(&format!("{color}{padded}{RESET}")),
            None => output.push_str(&padded),
        }
        output.push_str(&format!("{GRAY}│{RESET}"));
    }
    output.push('\n');
    output
}

fn render(title: &str, columns: &[Column], rows: &[Vec<String>], footer: Option<Vec<String>>) -> String {
    let headers: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();

    let mut output = banner(title);
    output.push_str(&border(columns, '┌', '┬', '┐'));
    output.push_str(&line(columns, &headers, Some(CYAN)));
    for row in rows {
        output.push_str(&border(columns, '├', '┼', '┤'));
        output.push_str(&line(columns, row, None));
    }
    if let Some(footer) = footer {
        output.push_str(&border(columns, '├', '┼', '┤'));
        output.push_str(&line(columns, &footer, Some(GREEN)));
    }
    output.push_str(&border(columns, '└', '┴', '┘'));
    output
}

/// Gray note for posts dropped because their date could not be read
fn malformed_dates_note(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    format!("\n{GRAY}{} posts with an unreadable date not shown{RESET}\n", count)
}

const ENGAGEMENT_HEADERS: [Column; 4] = [
    Column::right("Views", 8),
    Column::right("Likes", 8),
    Column::right("Shares", 8),
    Column::right("Comments", 8),
];

pub fn format_overview_table(view: &OverviewView) -> String {
    let mut columns = vec![Column::left("Month", 7), Column::left("Media", 20)];
    columns.extend(ENGAGEMENT_HEADERS);
    columns.push(Column::right("Posts", 6));

    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            let month = row
                .get_str(models::DATE)
                .and_then(|date| date.get(..7))
                .unwrap_or_default()
                .to_string();
            vec![
                month,
                row.value(models::MEDIA).to_string(),
                compact_cell(row, models::VUES),
                compact_cell(row, models::LIKES),
                compact_cell(row, models::PARTAGES),
                compact_cell(row, models::COMMENTAIRES),
                compact_cell(row, models::COUNT),
            ]
        })
        .collect();

    let totals = format_totals(
        &view.rows,
        &[
            models::VUES,
            models::LIKES,
            models::PARTAGES,
            models::COMMENTAIRES,
            models::COUNT,
        ],
    );
    let mut footer = vec!["Total".to_string(), String::new()];
    footer.extend(totals.into_iter().map(format_number_compact));

    let mut output = render("Monthly Engagement by Media", &columns, &rows, Some(footer));
    output.push_str(&malformed_dates_note(view.malformed_dates));
    output
}

pub fn format_hashtags_table(view: &HashtagsView) -> String {
    let mut columns = vec![Column::right("#", 3), Column::left("Hashtag", 24)];
    columns.extend(ENGAGEMENT_HEADERS);
    columns.push(Column::right("Posts", 6));

    let rows: Vec<Vec<String>> = view
        .hashtags
        .iter()
        .enumerate()
        .map(|(rank, stats)| {
            vec![
                (rank + 1).to_string(),
                stats.hashtag.clone(),
                format_number_compact(stats.vues),
                format_number_compact(stats.likes),
                format_number_compact(stats.partages),
                format_number_compact(stats.commentaires),
                stats.count.to_string(),
            ]
        })
        .collect();

    let mut output = render(
        &format!("Top Hashtags by {}", view.metric),
        &columns,
        &rows,
        None,
    );
    output.push_str(&malformed_dates_note(view.malformed_dates));
    output
}

pub fn format_video_length_table(view: &VideoLengthView) -> String {
    let mut columns = vec![Column::left("Seconds", 10)];
    columns.extend(ENGAGEMENT_HEADERS);
    columns.push(Column::right("Posts", 6));

    let rows: Vec<Vec<String>> = view
        .buckets
        .iter()
        .map(|bucket| {
            vec![
                format!("{}-{}", bucket.intervalle1, bucket.intervalle2),
                format_number_compact(bucket.vues),
                format_number_compact(bucket.likes),
                format_number_compact(bucket.partages),
                format_number_compact(bucket.commentaires),
                bucket.count.to_string(),
            ]
        })
        .collect();

    let mut output = render("Average Engagement by Video Length", &columns, &rows, None);
    let peak = view
        .buckets
        .iter()
        .filter(|bucket| bucket.count > 0)
        .filter_map(|bucket| Some((bucket, bucket.metric(view.metric)?)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((bucket, value)) = peak {
        output.push_str(&format!(
            "\n{GREEN}Peak {}: {}-{}s ({}){RESET}\n",
            view.metric,
            bucket.intervalle1,
            bucket.intervalle2,
            format_number_compact(value)
        ));
    }
    if view.dropped > 0 {
        output.push_str(&format!(
            "\n{GRAY}{} posts outside the length range not shown{RESET}\n",
            view.dropped
        ));
    }
    output.push_str(&malformed_dates_note(view.malformed_dates));
    output
}

pub fn format_songs_table(view: &SongsView) -> String {
    let columns = [
        Column::left("Song", 28),
        Column::left("Artists", 20),
        Column::right("Posts", 6),
        Column::right("Total", 8),
        Column::right("Average", 8),
        Column::right("Scaled", 6),
    ];
    let average = models::average_column(view.metric);
    let scaled = models::normalized_column(&view.normalized);

    let rows: Vec<Vec<String>> = view
        .songs
        .iter()
        .map(|row| {
            vec![
                row.value(models::MUSIQUE_TITRE).to_string(),
                row.value(&models::list_column(models::MUSIQUE_ARTISTE)).to_string(),
                compact_cell(row, models::COUNT),
                compact_cell(row, view.metric),
                compact_cell(row, &average),
                row.get_f64(&scaled)
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_default(),
            ]
        })
        .collect();

    let mut output = render(
        &format!("Songs by {}", view.metric),
        &columns,
        &rows,
        None,
    );
    let weights: Vec<String> = ["likes", "shares", "comments", "views"]
        .iter()
        .zip(view.weights.as_array())
        .map(|(label, weight)| format!("{label} {:.1}%", weight * 100.0))
        .collect();
    output.push_str(&format!("\n{GREEN}Weights: {}{RESET}\n", weights.join(" | ")));
    if view.excluded_original_sounds > 0 {
        output.push_str(&format!(
            "{GRAY}{} posts using an original sound were left out{RESET}\n",
            view.excluded_original_sounds
        ));
    }
    output.push_str(&malformed_dates_note(view.malformed_dates));
    output
}

/// One row per time block, one column per day
pub fn format_heatmap_table(view: &VideoPostingView) -> String {
    let mut columns = vec![Column::left("Time", 14)];
    columns.extend(view.days.iter().map(|day| {
        let short = DAYS_OF_WEEK
            .into_iter()
            .find(|d| *d == day.as_str())
            .map_or("?", |d| &d[..3]);
        Column::right(short, 6)
    }));

    let mut blocks = view.time_blocks.clone();
    blocks.sort();

    let rows: Vec<Vec<String>> = blocks
        .iter()
        .map(|block| {
            let mut cells = vec![block.clone()];
            for day in &view.days {
                let cell = view
                    .cells
                    .iter()
                    .find(|row| {
                        row.get_str(models::DAY_OF_WEEK) == Some(day.as_str())
                            && row.get_str(models::TIME_BLOCK) == Some(block.as_str())
                    })
                    .map(|row| compact_cell(row, &view.target))
                    .unwrap_or_default();
                cells.push(cell);
            }
            cells
        })
        .collect();

    let mut output = render(&format!("Posting Heatmap - {}", view.target), &columns, &rows, None);
    if view.malformed > 0 {
        output.push_str(&format!(
            "\n{GRAY}{} posts without a usable date or time not shown{RESET}\n",
            view.malformed
        ));
    }
    output
}

/// Column sums of a table of records
fn format_totals(rows: &[Record], columns: &[&str]) -> Vec<f64> {
    columns
        .iter()
        .map(|column| rows.iter().filter_map(|row| row.get_f64(column)).sum())
        .collect()
}
