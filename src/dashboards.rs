//! # Dashboards Module
//!
//! One pipeline per dashboard tab, from loaded rows to a printable view
//!
//! ## Key Components
//! - [`FilterState`] - Current media, date range and metric selection
//! - [`build_overview`] - Monthly totals per media account
//! - [`build_hashtags`] - Hashtag ranking
//! - [`build_video_length`] - Mean engagement per duration bucket
//! - [`build_songs`] - Engagement per song with metric weights
//! - [`build_video_posting`] - Dense day × time-block heatmap

use log::{debug, info};
use serde::Serialize;
use std::cmp::Ordering;

use crate::aggregation::{aggregate, trim, AggregateSpec};
use crate::cli::{Metric, SortOrder};
use crate::config::DashboardConfig;
use crate::data_processing::{
    apply_top, compute_average_count, normalize_column, sort_by_columns, weight_features,
    FeatureWeights,
};
use crate::datetime::{
    add_time_blocks, get_unique_time_blocks, normalize_dates, process_date_time, set_year,
    set_year_month, DateRange,
};
use crate::filtering::{
    filter_by_media, filter_data_by_dates, filter_data_strictly_between, filter_out_rows_by_value,
    remove_after, EmptySelection, ORIGINAL_SOUND,
};
use crate::grid::{fill, GridDomain};
use crate::hashtags::{group_by_hashtag, HashtagStats};
use crate::intervals::{aggregate_by_interval, IntervalBucket};
use crate::models::{self, Record, ENGAGEMENT_COLUMNS, UNKNOWN};

/// The interactive selection shared by every tab
#[derive(Debug, Clone)]
pub struct FilterState {
    pub media: Vec<String>,
    pub date_range: DateRange,
    pub metric: Metric,
    pub order: SortOrder,
    pub weekly: bool,
    pub top: Option<usize>,
}

impl FilterState {
    pub fn new(date_range: DateRange, metric: Metric) -> Self {
        Self {
            media: Vec::new(),
            date_range,
            metric,
            order: SortOrder::Desc,
            weekly: false,
            top: None,
        }
    }

    pub fn with_media(mut self, media: Vec<String>) -> Self {
        self.media = media;
        self
    }

    /// Column the heatmap colors by.
    ///
    /// Totals by default. With `weekly`, posts per week for `count` and the
    /// floored per-post mean (`<col>Average`) for the engagement metrics.
    pub fn posting_target(&self) -> String {
        match (self.weekly, self.metric) {
            (true, Metric::Count) => models::COUNT_AVERAGE.to_string(),
            (true, metric) => models::average_column(metric.column()),
            (false, metric) => metric.column().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverviewView {
    pub metric: &'static str,
    pub media: Vec<String>,
    /// Posts dropped because their date could not be read
    pub malformed_dates: usize,
    pub rows: Vec<Record>,
}

/// Monthly engagement sums per media account.
///
/// Months after the config cutoff are dropped. Each month keeps the date of
/// its first post as its representative date, and months are narrowed to
/// the selected range exclusive of both ends, then snapped to the first of the
/// month for plotting. No selected media means no lines.
pub fn build_overview(rows: &[Record], state: &FilterState, config: &DashboardConfig) -> OverviewView {
    let recent = remove_after(rows, config.overview_cutoff);
    let monthly = set_year_month(&set_year(&recent.rows));

    let spec = AggregateSpec::new(&ENGAGEMENT_COLUMNS, &[models::YEAR_MONTH, models::MEDIA])
        .with_lists(&[models::DATE]);
    let groups = aggregate(&monthly, &spec);
    let in_range = filter_data_strictly_between(&groups, &state.date_range);
    let selected = filter_by_media(&in_range.rows, &state.media, EmptySelection::Nothing);

    let sorted = sort_by_columns(&selected, &[models::DATE], false);

    OverviewView {
        metric: state.metric.column(),
        media: state.media.clone(),
        malformed_dates: recent.malformed + in_range.malformed,
        rows: normalize_dates(&sorted),
    }
}

#[derive(Debug, Serialize)]
pub struct HashtagsView {
    pub metric: &'static str,
    pub malformed_dates: usize,
    pub hashtags: Vec<HashtagStats>,
}

pub fn build_hashtags(rows: &[Record], state: &FilterState, config: &DashboardConfig) -> HashtagsView {
    let in_range = filter_data_by_dates(rows, &state.date_range);
    let selected = filter_by_media(&in_range.rows, &state.media, EmptySelection::All);
    let column = state.metric.column();

    let mut hashtags = group_by_hashtag(&selected);
    hashtags.sort_by(|a, b| {
        let a = a.metric(column).unwrap_or(0.0);
        let b = b.metric(column).unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    hashtags.truncate(state.top.unwrap_or(config.top_hashtags));

    HashtagsView {
        metric: column,
        malformed_dates: in_range.malformed,
        hashtags,
    }
}

#[derive(Debug, Serialize)]
pub struct VideoLengthView {
    pub metric: &'static str,
    pub buckets: Vec<IntervalBucket>,
    /// Posts left out for a missing or out-of-domain duration
    pub dropped: usize,
    pub malformed_dates: usize,
}

pub fn build_video_length(
    rows: &[Record],
    state: &FilterState,
    config: &DashboardConfig,
) -> VideoLengthView {
    let in_range = filter_data_by_dates(rows, &state.date_range);
    let selected = filter_by_media(&in_range.rows, &state.media, EmptySelection::All);
    let report = aggregate_by_interval(&selected, &config.intervals);

    VideoLengthView {
        metric: state.metric.column(),
        buckets: report.buckets,
        dropped: report.dropped,
        malformed_dates: in_range.malformed,
    }
}

#[derive(Debug, Serialize)]
pub struct SongsView {
    pub metric: &'static str,
    /// Column the `<col>Normalized` values were computed from
    pub normalized: String,
    pub weights: FeatureWeights,
    pub excluded_original_sounds: usize,
    pub malformed_dates: usize,
    pub songs: Vec<Record>,
}

/// Engagement per song title, with artists and media listed per song.
///
/// Placeholder "original sound" titles are excluded before anything else.
pub fn build_songs(rows: &[Record], state: &FilterState) -> SongsView {
    let licensed = filter_out_rows_by_value(rows, models::MUSIQUE_TITRE, &ORIGINAL_SOUND);
    let excluded_original_sounds = rows.len() - licensed.len();
    let in_range = filter_data_by_dates(&licensed, &state.date_range);
    let selected = filter_by_media(&in_range.rows, &state.media, EmptySelection::All);

    let spec = AggregateSpec::new(&ENGAGEMENT_COLUMNS, &[models::MUSIQUE_TITRE])
        .with_lists(&[models::MUSIQUE_ARTISTE, models::MEDIA]);
    let songs = aggregate(&selected, &spec);

    let column = state.metric.column();
    let normalized = if state.metric.is_engagement() {
        models::average_column(column)
    } else {
        column.to_string()
    };
    let songs = normalize_column(&songs, &normalized);
    let songs = sort_by_columns(&songs, &[normalized.as_str(), column], state.order.is_descending());

    debug!(
        "build_songs: {} songs, {} original sound rows excluded",
        songs.len(),
        excluded_original_sounds
    );

    SongsView {
        metric: column,
        weights: weight_features(&selected),
        normalized,
        excluded_original_sounds,
        malformed_dates: in_range.malformed,
        songs: apply_top(songs, state.top),
    }
}

#[derive(Debug, Serialize)]
pub struct VideoPostingView {
    pub target: String,
    pub days: Vec<String>,
    pub time_blocks: Vec<String>,
    /// Posts left out for an unreadable date or a missing time of day
    pub malformed: usize,
    pub cells: Vec<Record>,
}

const POSTING_SORT_COLUMNS: [&str; 5] = [
    "vuesAverage",
    models::VUES,
    models::LIKES,
    models::PARTAGES,
    models::COMMENTAIRES,
];

/// Heatmap of engagement by day of week and time of day.
///
/// No selected media means every account. Every day × block cell is present
/// in the output, padded with zeros where nothing was posted.
pub fn build_video_posting(
    rows: &[Record],
    state: &FilterState,
    config: &DashboardConfig,
) -> VideoPostingView {
    let selected = filter_by_media(rows, &state.media, EmptySelection::All);

    // `date` keeps only its day part from here on
    let derived = process_date_time(&selected);
    let in_range = filter_data_by_dates(&derived.rows, &state.date_range);
    let blocked = add_time_blocks(&in_range.rows, config.block_hours);
    let (known, unknown): (Vec<Record>, Vec<Record>) =
        blocked.rows.into_iter().partition(|row| {
            row.get_str(models::DAY_OF_WEEK) != Some(UNKNOWN)
                && row.get_str(models::TIME_BLOCK) != Some(UNKNOWN)
        });
    let malformed = in_range.malformed + unknown.len();
    if malformed > 0 {
        info!("{} posts without a usable date or time left out of the heatmap", malformed);
    }

    let mut columns = vec![models::DAY_OF_WEEK, models::TIME_BLOCK];
    columns.extend(ENGAGEMENT_COLUMNS);
    let known = trim(&known, &columns);

    let spec = AggregateSpec::new(&ENGAGEMENT_COLUMNS, &[models::DAY_OF_WEEK, models::TIME_BLOCK]);
    let cells = aggregate(&known, &spec);
    let cells = compute_average_count(&cells, &state.date_range);

    let domain = GridDomain::week(config.block_hours);
    let filler = spec.zero_record().with(models::COUNT_AVERAGE, 0i64);
    let cells = fill(&cells, &domain, &filler);
    let cells = sort_by_columns(&cells, &POSTING_SORT_COLUMNS, true);

    let target = state.posting_target();
    let cells = normalize_column(&cells, &target);

    VideoPostingView {
        time_blocks: get_unique_time_blocks(&cells),
        days: domain.days,
        target,
        malformed,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_test_row(date: &str, media: &str, vues: i64, likes: i64) -> Record {
        Record::new()
            .with(models::DATE, date)
            .with(models::MEDIA, media)
            .with(models::VUES, vues)
            .with(models::LIKES, likes)
            .with(models::PARTAGES, 1i64)
            .with(models::COMMENTAIRES, 2i64)
    }

    fn create_test_state(start: (i32, u32, u32), end: (i32, u32, u32), metric: Metric) -> FilterState {
        FilterState::new(
            DateRange::new(
                NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
                NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            ),
            metric,
        )
    }

    #[test]
    fn test_overview_without_media_is_empty() {
        let rows = vec![create_test_row("2022-05-03 10:00", "lemonde", 10, 1)];
        let state = create_test_state((2022, 1, 1), (2022, 12, 31), Metric::Vues);
        let view = build_overview(&rows, &state, &DashboardConfig::default());
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_overview_monthly_sums_per_media() {
        let rows = vec![
            create_test_row("2022-05-03 10:00", "lemonde", 10, 1),
            create_test_row("2022-05-20 10:00", "lemonde", 30, 3),
            create_test_row("2022-04-20 10:00", "lemonde", 5, 0),
            create_test_row("2022-05-21 10:00", "brut", 7, 0),
            // After the cutoff
            create_test_row("2023-04-02 10:00", "lemonde", 1000, 0),
        ];
        let state = create_test_state((2018, 11, 30), (2023, 4, 14), Metric::Vues)
            .with_media(vec!["lemonde".to_string()]);
        let view = build_overview(&rows, &state, &DashboardConfig::default());

        assert_eq!(view.rows.len(), 2);
        // Ascending by representative date
        assert_eq!(view.rows[0].get_str(models::DATE), Some("2022-04-01"));
        assert_eq!(view.rows[1].get_str(models::YEAR_MONTH), Some("2022>4"));
        assert_eq!(view.rows[1].get_i64(models::VUES), Some(40));
        assert_eq!(view.rows[1].get_i64(models::COUNT), Some(2));
        assert_eq!(view.rows[1].get_i64("vuesAverage"), Some(20));
    }

    #[test]
    fn test_overview_range_is_exclusive() {
        let rows = vec![create_test_row("2022-05-03 00:00", "brut", 10, 1)];
        let state = create_test_state((2022, 5, 3), (2022, 12, 31), Metric::Vues)
            .with_media(vec!["brut".to_string()]);
        let view = build_overview(&rows, &state, &DashboardConfig::default());
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_hashtags_ranked_by_metric() {
        let rows = vec![
            create_test_row("2022-05-03 10:00", "a", 10, 1).with(models::DESCRIPTION, "#low #high"),
            create_test_row("2022-05-04 10:00", "a", 10, 50).with(models::DESCRIPTION, "#high"),
            create_test_row("2022-05-05 10:00", "a", 10, 5).with(models::DESCRIPTION, "#mid"),
        ];
        let mut state = create_test_state((2022, 1, 1), (2022, 12, 31), Metric::Likes);
        state.top = Some(2);
        let view = build_hashtags(&rows, &state, &DashboardConfig::default());
        let tags: Vec<&str> = view.hashtags.iter().map(|h| h.hashtag.as_str()).collect();
        assert_eq!(tags, vec!["#high", "#mid"]);
        assert_eq!(view.hashtags[0].likes, 51.0);
    }

    #[test]
    fn test_video_length_end_to_end() {
        let rows = vec![
            create_test_row("2022-05-03 10:00", "a", 100, 10)
                .with(models::DUREE_SECONDES, 30i64),
            create_test_row("2022-05-04 10:00", "a", 50, 5)
                .with(models::DUREE_SECONDES, 40i64),
            create_test_row("2021-05-04 10:00", "a", 9999, 5)
                .with(models::DUREE_SECONDES, 40i64),
        ];
        let state = create_test_state((2022, 1, 1), (2022, 12, 31), Metric::Vues);
        let view = build_video_length(&rows, &state, &DashboardConfig::default());
        assert_eq!(view.buckets[1].count, 2);
        assert_eq!(view.buckets[1].vues, 75.0);
        assert_eq!(view.dropped, 0);
    }

    #[test]
    fn test_songs_excludes_original_sound() {
        let rows = vec![
            create_test_row("2022-05-03 10:00", "a", 100, 10)
                .with(models::MUSIQUE_TITRE, "Flowers")
                .with(models::MUSIQUE_ARTISTE, "Miley Cyrus"),
            create_test_row("2022-05-04 10:00", "b", 300, 10)
                .with(models::MUSIQUE_TITRE, "Flowers")
                .with(models::MUSIQUE_ARTISTE, "Miley Cyrus"),
            create_test_row("2022-05-04 10:00", "a", 50, 10)
                .with(models::MUSIQUE_TITRE, "Calm Down")
                .with(models::MUSIQUE_ARTISTE, "Rema"),
            create_test_row("2022-05-05 10:00", "a", 5000, 10)
                .with(models::MUSIQUE_TITRE, "son original - lemonde"),
        ];
        let state = create_test_state((2022, 1, 1), (2022, 12, 31), Metric::Vues);
        let view = build_songs(&rows, &state);

        assert_eq!(view.excluded_original_sounds, 1);
        assert_eq!(view.normalized, "vuesAverage");
        assert_eq!(view.songs.len(), 2);
        assert_eq!(view.songs[0].get_str(models::MUSIQUE_TITRE), Some("Flowers"));
        assert_eq!(view.songs[0].get_i64("vuesAverage"), Some(200));
        assert_eq!(view.songs[0].get_f64("vuesAverageNormalized"), Some(1.0));
        assert_eq!(view.songs[1].get_f64("vuesAverageNormalized"), Some(0.0));
        assert_eq!(view.songs[0].value("médiaList").to_string(), "a,b");

        let sum: f64 = view.weights.as_array().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tabs_count_unreadable_dates() {
        let rows = vec![
            create_test_row("2022-05-03 10:00", "a", 100, 10).with(models::DESCRIPTION, "#news"),
            create_test_row("garbage 10:00", "a", 100, 10).with(models::DESCRIPTION, "#news"),
            create_test_row("2022-13-45 10:00", "a", 100, 10).with(models::DESCRIPTION, "#news"),
        ];
        let config = DashboardConfig::default();
        let state = create_test_state((2022, 1, 1), (2022, 12, 31), Metric::Vues)
            .with_media(vec!["a".to_string()]);

        let hashtags = build_hashtags(&rows, &state, &config);
        assert_eq!(hashtags.malformed_dates, 2);
        assert_eq!(hashtags.hashtags[0].count, 1);

        assert_eq!(build_overview(&rows, &state, &config).malformed_dates, 2);
        assert_eq!(build_video_length(&rows, &state, &config).malformed_dates, 2);
        assert_eq!(build_songs(&rows, &state).malformed_dates, 2);
    }

    #[test]
    fn test_video_posting_grid_is_complete() {
        let rows = vec![
            // 2023-01-02 is a Monday
            create_test_row("2023-01-02 10:15", "a", 100, 1),
            create_test_row("2023-01-09 11:59", "a", 50, 1),
            create_test_row("2023-01-03", "a", 70, 1),
        ];
        let mut state = create_test_state((2023, 1, 1), (2023, 1, 15), Metric::Count);
        state.weekly = true;
        let view = build_video_posting(&rows, &state, &DashboardConfig::default());

        assert_eq!(view.cells.len(), 84);
        assert_eq!(view.malformed, 1);
        assert_eq!(view.target, "countAverage");
        assert_eq!(view.time_blocks.len(), 12);

        let top = &view.cells[0];
        assert_eq!(top.get_str(models::DAY_OF_WEEK), Some("Monday"));
        assert_eq!(top.get_str(models::TIME_BLOCK), Some("10:00 to 12:00"));
        assert_eq!(top.get_i64(models::COUNT), Some(2));
        assert_eq!(top.get_i64(models::COUNT_AVERAGE), Some(1));
        assert_eq!(top.get_f64("countAverageNormalized"), Some(1.0));
        assert_eq!(view.cells[1].get_f64("countAverageNormalized"), Some(0.0));
    }

    #[test]
    fn test_video_posting_keeps_posts_on_the_last_day() {
        let rows = vec![
            create_test_row("2023-01-15 10:00:00", "a", 100, 1),
            create_test_row("2023-01-16 00:30:00", "a", 100, 1),
        ];
        let state = create_test_state((2023, 1, 1), (2023, 1, 15), Metric::Count);
        let view = build_video_posting(&rows, &state, &DashboardConfig::default());

        let counted: i64 = view
            .cells
            .iter()
            .filter_map(|cell| cell.get_i64(models::COUNT))
            .sum();
        assert_eq!(counted, 1);
        assert_eq!(view.malformed, 0);
    }

    #[test]
    fn test_video_posting_counts_unreadable_dates() {
        let rows = vec![
            create_test_row("2023-01-05 10:00:00", "a", 100, 1),
            create_test_row("garbage 10:00:00", "a", 100, 1),
            create_test_row("2023-13-45 10:00:00", "a", 100, 1),
        ];
        let state = create_test_state((2023, 1, 1), (2023, 1, 31), Metric::Vues);
        let view = build_video_posting(&rows, &state, &DashboardConfig::default());

        let counted: i64 = view
            .cells
            .iter()
            .filter_map(|cell| cell.get_i64(models::COUNT))
            .sum();
        assert_eq!(counted, 1);
        assert_eq!(view.malformed, 2);
    }

    #[test]
    fn test_posting_target_column() {
        let mut state = create_test_state((2023, 1, 1), (2023, 1, 15), Metric::Likes);
        assert_eq!(state.posting_target(), "likes");
        state.weekly = true;
        assert_eq!(state.posting_target(), "likesAverage");
    }
}
