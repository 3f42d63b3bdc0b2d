//! Shared networking constants and helpers used by server and client.

/// TCP port the trigger/read endpoints listen on.
pub const TRIGGER_PORT: u16 = 8090;

/// Path of the scheduled price update trigger.
pub const UPDATE_PATH: &str = "/api/cron/updatePrices";
/// Prefix of the asset read endpoints.
pub const ASSETS_PATH: &str = "/api/assets";

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
