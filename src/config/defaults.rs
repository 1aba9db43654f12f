//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default table page size
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default sort column
pub const DEFAULT_SORT_BY: &str = "id";

/// Default sort direction
pub const DEFAULT_DIRECTION: &str = "asc";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7295;

/// Default map view center latitude (Guadalajara)
pub const DEFAULT_CENTER_LAT: f64 = 20.7214;

/// Default map view center longitude (Guadalajara)
pub const DEFAULT_CENTER_LNG: f64 = -103.3905;

/// Default map view zoom level
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "poi-median";
