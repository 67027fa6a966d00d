//! # CLI Module
//!
//! Command-line interface definitions and argument parsing for vidstats
//!
//! ## Key Components
//! - [`Args`] - Main CLI arguments structure
//! - [`Commands`] - One subcommand per dashboard tab
//! - [`Metric`] - Engagement column selection
//! - [`SortOrder`] - Result sorting options

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::models;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn is_descending(self) -> bool {
        matches!(self, SortOrder::Desc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    Vues,
    Likes,
    Partages,
    Commentaires,
    /// Number of posts
    Count,
}

impl Metric {
    pub fn column(self) -> &'static str {
        match self {
            Metric::Vues => models::VUES,
            Metric::Likes => models::LIKES,
            Metric::Partages => models::PARTAGES,
            Metric::Commentaires => models::COMMENTAIRES,
            Metric::Count => models::COUNT,
        }
    }

    pub fn is_engagement(self) -> bool {
        !matches!(self, Metric::Count)
    }
}

/// Date range and media selection shared by every tab
#[derive(Debug, Clone, ClapArgs)]
pub struct SelectionArgs {
    /// Keep posts from this date on (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Keep posts up to and including this date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Restrict to these media accounts (repeatable)
    #[arg(long = "media")]
    pub media: Vec<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Monthly engagement per media account
    Overview {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Engagement metric to report
        #[arg(long, default_value = "vues", value_enum)]
        metric: Metric,
    },
    /// Most engaging hashtags
    Hashtags {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Engagement metric used for the ranking
        #[arg(long, default_value = "likes", value_enum)]
        metric: Metric,

        /// Number of hashtags to keep
        #[arg(long)]
        top: Option<usize>,
    },
    /// Average engagement per video length interval
    VideoLength {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Engagement metric to highlight
        #[arg(long, default_value = "vues", value_enum)]
        metric: Metric,
    },
    /// Engagement per song, original sounds excluded
    Songs {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Engagement metric used for sorting and normalization
        #[arg(long, default_value = "vues", value_enum)]
        metric: Metric,

        /// Sort order for results
        #[arg(long, default_value = "desc", value_enum)]
        order: SortOrder,

        /// Show only the first N songs
        #[arg(long)]
        top: Option<usize>,
    },
    /// Day of week by time of day heatmap
    VideoPosting {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Metric used for the heatmap color
        #[arg(long, default_value = "vues", value_enum)]
        metric: Metric,

        /// Color by averages instead of totals: posts per week for `count`, per-post means otherwise
        #[arg(long)]
        weekly: bool,

        /// Length of a time block in hours
        #[arg(long)]
        block_hours: Option<u32>,
    },
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Video engagement analytics - grouping, heatmaps and rankings over a post dataset"
)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to the source CSV (can also use VIDSTATS_DATA env var)
    #[arg(long, global = true)]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_posting_flags() {
        let args = Args::parse_from([
            "vidstats",
            "video-posting",
            "--media",
            "lemonde",
            "--media",
            "brut",
            "--weekly",
            "--metric",
            "count",
        ]);
        match args.command {
            Commands::VideoPosting {
                selection,
                metric,
                weekly,
                block_hours,
            } => {
                assert_eq!(selection.media, vec!["lemonde", "brut"]);
                assert_eq!(metric, Metric::Count);
                assert!(weekly);
                assert_eq!(block_hours, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_data_flag() {
        let args = Args::parse_from(["vidstats", "hashtags", "--data", "posts.csv"]);
        assert_eq!(args.data.as_deref(), Some("posts.csv"));
    }

    #[test]
    fn test_metric_columns() {
        assert_eq!(Metric::Vues.column(), "vues");
        assert_eq!(Metric::Count.column(), "count");
        assert!(!Metric::Count.is_engagement());
    }
}
