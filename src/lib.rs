pub mod checksum;
pub mod cli;
pub mod common;
pub mod driver;
pub mod error;
pub mod probe;
pub mod resolve;
pub mod socket;
pub mod stats;

pub use crate::error::PingError;
pub use crate::probe::{Identifier, ProbeResult, Prober};
pub use crate::socket::{IcmpSocket, RawSocket, SocketOpener};
pub use crate::stats::RunStatistics;
