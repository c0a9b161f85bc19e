/// Timeout the adapter uses for configuration round-trips unless configured otherwise (milliseconds)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u32 = 1000;
/// Timeout the adapter uses for transmissions unless configured otherwise (milliseconds)
pub const DEFAULT_SEND_TIMEOUT_MS: u32 = 1000;
/// Transmission timeout used by the low-latency adapter preset (milliseconds)
pub const LOW_LATENCY_SEND_TIMEOUT_MS: u32 = 50;
/// Upper bound accepted for any configured timeout (milliseconds)
pub const MAX_TIMEOUT_MS: u32 = 60_000;
