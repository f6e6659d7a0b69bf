//! What to render and where the chart page lives.

/// How far back a chart reaches from its anchor time.
pub const CHART_WINDOW_MS: u64 = 60 * 60 * 1000;

/// Parameters for a single chart.
///
/// The chart covers the hour leading up to `time_ms`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Identifier of the render, used for the image file name.
    pub id: String,
    /// Namespace whose data is charted.
    pub namespace: String,
    /// Measurement (series) to chart.
    pub measurement: String,
    /// End of the chart window, unix milliseconds.
    pub time_ms: u64,
    /// Aggregation function applied by the chart page.
    pub func: String,
    /// Chart title.
    pub title: String,
    /// Extra series filter passed to the chart page.
    pub filter: String,
}

impl RenderOptions {
    /// Create options for a measurement in a namespace.
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        measurement: impl Into<String>,
        time_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            measurement: measurement.into(),
            time_ms,
            ..Default::default()
        }
    }

    pub fn func(mut self, func: impl Into<String>) -> Self {
        self.func = func.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Start of the chart window, unix milliseconds.
    pub fn start_ms(&self) -> u64 {
        self.time_ms.saturating_sub(CHART_WINDOW_MS)
    }
}

/// URL of the chart page for `opts`, relative to `base`.
///
/// Parameters are passed through as given.
pub fn render_url(base: &str, opts: &RenderOptions) -> String {
    format!(
        "{}?ns={}&measurement={}&starttime={}&endtime={}&fn={}&title={}&where={}",
        base,
        opts.namespace,
        opts.measurement,
        opts.start_ms(),
        opts.time_ms,
        opts.func,
        opts.title,
        opts.filter
    )
}

/// File name of the image for a render id.
///
/// Quotes, slashes and parentheses are replaced so the id cannot escape the
/// image directory or break the renderer's argument parsing.
pub fn image_file_name(id: &str) -> String {
    format!("{id}.png")
        .chars()
        .map(|c| match c {
            '"' | '\'' | '/' | '(' | ')' => '_',
            c => c,
        })
        .collect()
}
