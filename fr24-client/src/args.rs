//! Command-line overrides for the config file.

use clap::Args;

use fr24_core::config::FileConfig;
use fr24_core::CallsignPolicy;

/// Feed settings shared by every subcommand. Each flag overrides the file.
#[derive(Args, Debug, Clone, Default)]
pub struct FeedArgs {
    /// Home latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Home longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Only keep flights within this many km of home
    #[arg(long)]
    pub radius: Option<f64>,

    /// Feed host
    #[arg(long, env = "FR24_HOST")]
    pub host: Option<String>,

    /// Feed port
    #[arg(long, env = "FR24_PORT")]
    pub port: Option<u16>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Number of poll results kept in history
    #[arg(long)]
    pub history_depth: Option<usize>,

    /// Callsign memory policy: first_seen or most_recent
    #[arg(long)]
    pub callsign_policy: Option<CallsignPolicy>,
}

impl FeedArgs {
    /// Apply every flag that was given on top of `config`.
    pub fn apply(&self, config: &mut FileConfig) {
        if let Some(lat) = self.lat {
            config.home.lat = Some(lat);
        }
        if let Some(lon) = self.lon {
            config.home.lon = Some(lon);
        }
        if let Some(radius) = self.radius {
            config.filter.radius_km = Some(radius);
        }
        if let Some(host) = &self.host {
            config.feed.host = host.clone();
        }
        if let Some(port) = self.port {
            config.feed.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.feed.timeout_secs = timeout;
        }
        if let Some(depth) = self.history_depth {
            config.aggregator.history_depth = depth;
        }
        if let Some(policy) = self.callsign_policy {
            config.aggregator.callsign_policy = policy;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
