/// Logging setup knobs, sourced from `POLYSCRIBE_*` environment
/// variables so they never collide with a co-deployed service.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Directives used when `RUST_LOG` is unset.
    pub default_directives: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("POLYSCRIBE_ENV")
                .unwrap_or_else(|_| "development".to_string()),
            json_format: std::env::var("POLYSCRIBE_LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_directives: "info,polyscribe=debug".to_string(),
        }
    }
}
