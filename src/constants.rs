// Constants module - centralized default values for configuration
//
// Every tunable used by the image pipeline and the upload server lives here
// so that the config layer, the pipeline and the tests agree on one value.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 4500;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum upload size (20 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

/// Default HTML page served at `/`
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// Multipart field carrying the image
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Optional multipart field overriding the target width
pub const WIDTH_FIELD_NAME: &str = "width";

// =============================================================================
// Pipeline defaults
// =============================================================================

/// Default output width in pixels
pub const DEFAULT_TARGET_WIDTH: u32 = 2000;

/// Largest target width an upload may request
pub const DEFAULT_MAX_TARGET_WIDTH: u32 = 4096;

/// Default JPEG quality when the request does not specify one
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Maximum decoded or resized pixel count (100 megapixels)
pub const DEFAULT_MAX_SOURCE_PIXELS: u64 = 100_000_000;

/// GIF quantizer speed (1 = best palette, 30 = fastest)
pub const GIF_QUANTIZER_SPEED: i32 = 10;

// =============================================================================
// Watermark defaults
// =============================================================================

/// Default watermark image path
pub const DEFAULT_WATERMARK_PATH: &str = "logo.png";

/// Default watermark opacity (alpha 200 of 255)
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.78;

/// Default distance from the right and bottom edges in pixels
pub const DEFAULT_WATERMARK_MARGIN: u32 = 20;

/// The watermark is shrunk when wider than base width divided by this
pub const DEFAULT_SHRINK_DIVISOR: u32 = 8;

/// Width a too-large watermark is shrunk to
pub const DEFAULT_SHRINK_WIDTH: u32 = 255;

// =============================================================================
// Storage defaults
// =============================================================================

/// Default directory uploads are written to
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

// =============================================================================
// Metrics
// =============================================================================

/// Processing duration samples kept for the percentile summary
pub const MAX_DURATION_SAMPLES: usize = 10_000;
