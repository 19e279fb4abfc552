//! Default values for configuration

/// Default nREPL host
pub fn default_nrepl_host() -> String {
    std::env::var("NREPL_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

/// Default nREPL port
pub fn default_nrepl_port() -> u16 {
    std::env::var("NREPL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(36915)
}

/// Default socket timeout in seconds, applied to every connect, read and write
pub fn default_nrepl_timeout() -> u64 {
    30
}

/// Default maximum number of reads while waiting for an eval to finish
pub fn default_nrepl_max_reads() -> usize {
    100
}

/// Default size of a single socket read
pub fn default_nrepl_read_buffer_size() -> usize {
    4096
}

/// Default: highlight successful results
pub fn default_highlight() -> bool {
    true
}
