/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Hours spanned by the keogram's horizontal axis.
pub const HOURS_PER_STRIP: u32 = 24;

/// Default ring radius as a fraction of min(width, height).
pub const DEFAULT_CIRCLE_RADIUS_FACTOR: f64 = 0.3;

/// Default radial thickness of the keogram ring in pixels.
pub const DEFAULT_RING_HEIGHT: u32 = 80;

/// Default gap between the inner circle and the keogram ring in pixels.
pub const DEFAULT_RING_PADDING: u32 = 10;

/// Default extra margin added on a side whenever the canvas has to grow.
pub const DEFAULT_EDGE_PADDING: u32 = 20;

/// Weight of the keogram strip when blended with the progress strip.
/// The progress strip receives `1.0 - DEFAULT_KEOGRAM_WEIGHT`.
pub const DEFAULT_KEOGRAM_WEIGHT: f32 = 0.8;

/// Number of columns behind the progress marker that fade out.
pub const MARKER_TRAIL_WIDTH: u32 = 4;

/// Width in pixels of the bright progress marker column.
pub const MARKER_WIDTH: u32 = 2;

/// Brightness of the hour gridlines in the progress strip.
pub const GRIDLINE_INTENSITY: u8 = 160;

/// Pixel size of the hour label font.
pub const LABEL_FONT_SIZE: f32 = 12.0;

/// Default output framerate.
pub const DEFAULT_FRAMERATE: f64 = 25.0;

/// Default video duration ceiling in seconds.
pub const DEFAULT_MAX_LENGTH_SECONDS: f64 = 120.0;

/// Default lower bound for the adaptive output framerate.
pub const DEFAULT_MIN_FPS: f64 = 10.0;

/// Default upper bound for the adaptive output framerate.
pub const DEFAULT_MAX_FPS: f64 = 60.0;

/// Default scaling box for composited frames.
pub const DEFAULT_OUTPUT_WIDTH: u32 = 1920;
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 1080;

/// File name of the run status side file in the output directory.
pub const STATUS_FILE_NAME: &str = "keolapse-status.json";

/// File names of the optional debug stills.
pub const RING_PREVIEW_FILE_NAME: &str = "ring-preview.png";
pub const FRAME_PREVIEW_FILE_NAME: &str = "frame-preview.png";

/// Quantizer for the intermediate `mpeg4` container (2 = near lossless).
pub const RAW_INTERMEDIATE_QSCALE: u32 = 2;

/// Accepted range for an explicit encoder bitrate.
pub const MIN_BITRATE_KBPS: u32 = 1;
pub const MAX_BITRATE_KBPS: u32 = 1_000_000;

/// Highest CRF accepted by the supported codecs.
pub const MAX_CRF: u32 = 63;
