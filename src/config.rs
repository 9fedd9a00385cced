/// Application-level constants
pub const APP_NAME: &str = "Caseline";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default context window for event descriptions (characters from the
/// matched date onward).
pub const DEFAULT_EVENT_WINDOW: usize = 200;

/// Default page limit per segmentation batch. Synchronous OCR backends
/// commonly cap requests at 15 pages; larger documents are split.
pub const DEFAULT_BATCH_PAGE_LIMIT: usize = 15;

/// Filename for the reconstructed-layout audit artifact.
pub const LAYOUT_ARTIFACT_FILENAME: &str = "layout_output.txt";

/// US Letter width in PDF points, used when no case PDF is available to
/// read the real page width from.
pub const DEFAULT_PAGE_WIDTH_PTS: f64 = 612.0;

/// Caption font size for PDF highlight annotations (points).
pub const CAPTION_FONT_SIZE: f64 = 12.0;

/// Vertical gap between the top of a highlight box and its caption (points).
pub const CAPTION_OFFSET_PTS: f64 = 12.0;

/// Rows allotted per page when the layout canvas places elements at
/// scaled y positions instead of one row per element.
pub const DEFAULT_ROWS_PER_PAGE: usize = 90;

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "caseline=info"
}
