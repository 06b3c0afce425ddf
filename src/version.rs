// Name and version baked in from Cargo.toml; served on GET /version and sent as the sender's User-Agent.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");
