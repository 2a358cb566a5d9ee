use clap::Parser;

use crate::common::DEFAULT_COUNT;

/// Measures reachability and round-trip time with ICMP echo requests.
#[derive(Parser, Debug)]
#[command(name = "rping", version)]
pub struct Args {
    /// The IP address or domain to ping.
    pub destination: String,

    /// Number of pings to perform.
    #[arg(short, long, default_value_t = DEFAULT_COUNT)]
    pub count: u32,
}
