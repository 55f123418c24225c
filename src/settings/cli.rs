use super::Parser;

/// Token-scoped verification service for sensitive account operations.
#[derive(Parser, Debug)]
#[command(name = "passport")]
pub struct Cli {
    /// Path to a TOML settings file; defaults depend on the build profile.
    #[arg(long)]
    pub settings: Option<String>,
}
