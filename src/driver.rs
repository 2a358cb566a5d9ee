//! Runs a sequence of probes against one destination and reports on them.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::error::PingError;
use crate::probe::{ProbeResult, Prober};
use crate::resolve::{validate_hostname, validate_ip};
use crate::socket::SocketOpener;
use crate::stats::RunStatistics;

/// Validates `destination` and, if it is acceptable, probes it `count`
/// times. Returns `None` when the destination was rejected before any probe.
pub fn ping_destination<O, W>(
    prober: &Prober<O>,
    destination: &str,
    count: u32,
    stop: &AtomicBool,
    out: &mut W,
) -> Result<Option<RunStatistics>, PingError>
where
    O: SocketOpener,
    W: Write,
{
    if !validate_ip(destination) && !validate_hostname(destination) {
        writeln!(out, "Invalid IP address or hostname.").map_err(PingError::Io)?;
        return Ok(None);
    }
    verbose_ping(prober, destination, count, stop, out).map(Some)
}

/// Sends `count` probes one after another, printing each outcome and a
/// summary at the end.
///
/// Failed probes count as sent but unanswered. Only fatal errors end the
/// run early. Setting `stop` ends it before the next probe; the summary is
/// still printed.
pub fn verbose_ping<O, W>(
    prober: &Prober<O>,
    destination: &str,
    count: u32,
    stop: &AtomicBool,
    out: &mut W,
) -> Result<RunStatistics, PingError>
where
    O: SocketOpener,
    W: Write,
{
    info!(
        "pinging {} {} times, id={} timeout={:?}",
        destination,
        count,
        prober.identifier(),
        prober.timeout()
    );
    let mut stats = RunStatistics::default();

    for _ in 0..count {
        if stop.load(Ordering::Relaxed) {
            info!("stopped after {} probes", stats.sent);
            break;
        }
        writeln!(out, "Pinging {}...", destination).map_err(PingError::Io)?;
        stats.record_sent();

        let written = match prober.probe_once(destination) {
            Ok(ProbeResult::RoundTripTime(rtt)) => {
                let rtt_ms = rtt.as_secs_f64() * 1000.0;
                stats.record_reply(rtt_ms);
                writeln!(out, "Received ping in {:.4}ms", rtt_ms)
            }
            Ok(ProbeResult::Timeout) => writeln!(
                out,
                "Ping Timed out. (timeout within {}s)",
                prober.timeout().as_secs_f64()
            ),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("probe to {} failed: {}", destination, e);
                writeln!(out, "Failed. ({})", e)
            }
        };
        written.map_err(PingError::Io)?;
    }

    stats.write_summary(out).map_err(PingError::Io)?;
    Ok(stats)
}
