//! Application-wide constants and default values
//!
//! Centralizes the defaults of the application state, the profiling backend
//! and the UI layout.

/// Defaults restored by `RESET_STATE`
pub mod state {
    /// Default time bucket size in seconds
    pub const DEFAULT_BUCKET_SIZE: f64 = 1.0;

    /// Marker for an unbounded side of a selection tuple
    pub const UNBOUNDED: f64 = -1.0;

    /// Selection tuple meaning "no range selected"
    pub const UNSET_SELECTION: [f64; 2] = [UNBOUNDED, UNBOUNDED];

    /// `multipleChartDataLength` before any multi-chart dashboard is mounted
    pub const UNSET_MULTIPLE_CHART_DATA_LENGTH: i32 = -1;
}

/// Selectable widget values
pub mod widgets {
    /// Bucket sizes offered by the bucket-size dropdown
    pub const BUCKET_SIZES: [f64; 11] = [0.1, 0.2, 0.5, 0.7, 1.0, 2.5, 5.0, 7.5, 10.0, 50.0, 100.0];
}

/// Profiler data layout
pub mod profile {
    /// Default CSV field separator of the profiler export
    pub const DEFAULT_SEPARATOR: char = ';';

    /// Rows scanned per parse chunk when collecting universes
    pub const PARSE_CHUNK_ROWS: usize = 50_000;

    /// Raw addresses are grouped into buckets of this width
    pub const MEMORY_ADDRESS_DIVISOR: i64 = 100_000_000;

    /// Suffix of the optional query-plan file stored next to the CSV
    pub const QUERY_PLAN_SUFFIX: &str = "plan.json";

    pub const COL_OPERATOR: &str = "operator";
    pub const COL_EVENT: &str = "ev_name";
    pub const COL_TIME: &str = "time";
    pub const COL_PIPELINE: &str = "pipeline";
    pub const COL_ADDRESS: &str = "addr";
    pub const COL_UIR: &str = "uir_code";
    /// Line number of the sample's instruction in the UIR dump
    pub const COL_SRCLINE: &str = "srcline";

    /// Columns the dashboard cannot work without
    pub const REQUIRED_COLUMNS: [&str; 7] = [
        COL_OPERATOR,
        COL_EVENT,
        COL_TIME,
        COL_PIPELINE,
        COL_ADDRESS,
        COL_UIR,
        COL_SRCLINE,
    ];
}

/// Chart rendering defaults
pub mod charts {
    /// UIR lines above this share of samples (percent) are highlighted
    pub const UIR_HOT_THRESHOLD: f64 = 5.0;

    /// Fixed domain of stacked proportions
    pub const PROPORTION_DOMAIN: [f64; 2] = [0.0, 1.0];

    /// Hottest UIR lines listed in a query-plan node tooltip
    pub const PLAN_TOOLTIP_UIR_LINES: usize = 5;

    /// UIR text longer than this is cut in the plan tooltip
    pub const PLAN_TOOLTIP_LINE_CHARS: usize = 65;
}

/// UI layout defaults
pub mod layout {
    /// Left panel (selection controls) default width
    pub const CONTROLS_PANEL_WIDTH: f32 = 240.0;

    /// Minimum width of one heatmap panel before wrapping to a new row
    pub const HEATMAP_PANEL_MIN_WIDTH: f32 = 320.0;

    /// Height of one heatmap panel
    pub const HEATMAP_PANEL_HEIGHT: f32 = 220.0;

    /// Longest heatmap texture side; longer axes are binned
    pub const HEATMAP_MAX_TEXTURE_SIDE: usize = 2048;

    /// Minimum plot height
    pub const MIN_PLOT_HEIGHT: f32 = 200.0;
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "profile-oxide.json";
}
