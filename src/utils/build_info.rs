/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
}

/// Returns the statically-embedded build metadata.
pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("LEDGER_CORE_BUILD_HASH").unwrap_or("unknown"),
        timestamp: option_env!("LEDGER_CORE_BUILD_TIMESTAMP").unwrap_or("unknown"),
        profile: option_env!("LEDGER_CORE_BUILD_PROFILE").unwrap_or("unknown"),
    }
}

impl BuildMetadata {
    pub fn summary(&self) -> String {
        format!(
            "ledger_core {} ({} {}, built {})",
            self.version, self.git_hash, self.profile, self.timestamp
        )
    }
}
