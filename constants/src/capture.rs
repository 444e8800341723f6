/// Lower bound applied to the operator-configured settle delay (milliseconds).
pub const MIN_SETTLE_DELAY_MS: u64 = 100;

/// Default settle delay between camera placement and readback (milliseconds).
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 300;

/// Delay before the single retry of an implausibly small readback (milliseconds).
pub const EMPTY_FRAME_RETRY_DELAY_MS: u64 = 500;

/// Renders forced per pose, each separated by a display refresh.
pub const FORCED_RENDER_COUNT: usize = 3;

/// Encoded frames smaller than this are treated as empty.
/// Matches a 1000 character PNG data URL.
pub const MIN_PLAUSIBLE_IMAGE_BYTES: usize = 733;

/// Maximum readback retries for an implausibly small frame.
pub const MAX_EMPTY_FRAME_RETRIES: usize = 1;

/// Zero padding of the running counter in capture ids.
pub const CAPTURE_ID_COUNTER_WIDTH: usize = 4;

/// Length of the random suffix in capture ids.
pub const CAPTURE_ID_SUFFIX_LEN: usize = 6;

/// Deflate level used for the dataset archive.
pub const ARCHIVE_COMPRESSION_LEVEL: i64 = 6;

/// Pause between captures when delivering files individually (milliseconds).
pub const FALLBACK_DELIVERY_PAUSE_MS: u64 = 200;

/// File name of the dataset manifest.
pub const MANIFEST_FILE_NAME: &str = "dataset_config.json";

/// Default JPEG quality when JPEG encoding is selected.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Directory that native builds export datasets into.
pub const DEFAULT_EXPORT_DIR: &str = "lora_exports";
