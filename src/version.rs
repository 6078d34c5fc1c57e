// Name and version baked in at build time.

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// "hostwatch 0.1.0", logged once at startup.
pub fn banner() -> String {
    format!("{NAME} {VERSION}")
}
