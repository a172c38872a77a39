/// Binding-level defaults.
/// Lengths are meters, angles degrees.
pub const DEFAULT_LOT_ID: &str = "lot";
pub const DEFAULT_FOOTPRINT_ID: &str = "footprint";
/// Records above this level are not forwarded to the console.
pub const MAX_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
