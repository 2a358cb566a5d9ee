//! The ICMP probe engine: one echo request out, one matching reply back.

use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use log::{debug, trace};
use pnet::packet::ipv4::Ipv4Packet;

use crate::common::{
    EchoRequest, DEFAULT_TIMEOUT, ICMP_ECHO_REPLY, IPV4_HEADER_LEN, RECV_BUFFER_LEN,
};
use crate::error::PingError;
use crate::resolve::resolve_host;
use crate::socket::{IcmpSocket, SocketOpener};

/// Tags this run's echo requests so replies to other senders on the same
/// host can be told apart. Generated once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier(pub u16);

impl Identifier {
    pub fn random() -> Self {
        Identifier(rand::random())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Monotonic time source. Timestamps are seconds since the clock started,
/// so they are only meaningful to the run that created them.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Clock {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeResult {
    RoundTripTime(Duration),
    Timeout,
}

/// Builds an echo request stamped with the current time and sends it to
/// `destination`.
pub fn send<S: IcmpSocket>(
    socket: &mut S,
    destination: Ipv4Addr,
    identifier: Identifier,
    clock: &Clock,
) -> Result<(), PingError> {
    let packet = EchoRequest::new(identifier.0, clock.now()).encode()?;
    socket
        .send_to(&packet, destination)
        .map_err(PingError::Transport)?;
    debug!(
        "sent {} byte echo request to {} id={}",
        packet.len(),
        destination,
        identifier
    );
    Ok(())
}

/// Waits for the echo reply carrying `identifier`.
///
/// Each wait is bounded by what is left of `timeout`, so skipped datagrams
/// never stretch the total wait past it.
pub fn receive<S: IcmpSocket>(
    socket: &mut S,
    identifier: Identifier,
    clock: &Clock,
    timeout: Duration,
) -> Result<ProbeResult, PingError> {
    let mut remaining = timeout;
    let mut buf = [0u8; RECV_BUFFER_LEN];
    loop {
        let started = Instant::now();
        let readable = match socket.wait_readable(remaining) {
            Ok(false) => return Ok(ProbeResult::Timeout),
            Ok(true) => true,
            // A signal cut the wait short; keep waiting on what is left.
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => false,
            Err(e) => return Err(PingError::Transport(e)),
        };

        if readable {
            let received_at = clock.now();
            let len = socket.recv(&mut buf).map_err(PingError::Transport)?;
            if let Some(rtt) = match_reply(&buf[..len], identifier, received_at) {
                return Ok(ProbeResult::RoundTripTime(rtt));
            }
        }

        remaining = match remaining.checked_sub(started.elapsed()) {
            Some(left) if !left.is_zero() => left,
            _ => return Ok(ProbeResult::Timeout),
        };
    }
}

/// Returns the round-trip time if `datagram` is an echo reply to this run.
fn match_reply(datagram: &[u8], identifier: Identifier, received_at: f64) -> Option<Duration> {
    let source = Ipv4Packet::new(datagram).map(|ip| ip.get_source());
    let reply = match datagram.get(IPV4_HEADER_LEN..).and_then(EchoRequest::decode) {
        Some(reply) => reply,
        None => {
            trace!("skipping short datagram ({} bytes) from {:?}", datagram.len(), source);
            return None;
        }
    };

    let header = reply.header;
    if header.icmp_type != ICMP_ECHO_REPLY || header.icmp_identifier != identifier.0 {
        trace!(
            "skipping ICMP type {} id={:#06x} from {:?}",
            header.icmp_type,
            header.icmp_identifier,
            source
        );
        return None;
    }

    match Duration::try_from_secs_f64(received_at - reply.sent_at) {
        Ok(rtt) => Some(rtt),
        Err(_) => {
            trace!("skipping reply with bad timestamp {}", reply.sent_at);
            None
        }
    }
}

/// Sends probes to one destination over a fresh socket each time.
pub struct Prober<O> {
    opener: O,
    resolver: fn(&str) -> Option<Ipv4Addr>,
    identifier: Identifier,
    clock: Clock,
    timeout: Duration,
}

impl<O: SocketOpener> Prober<O> {
    pub fn new(opener: O, identifier: Identifier) -> Self {
        Prober {
            opener,
            resolver: resolve_host,
            identifier,
            clock: Clock::start(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_resolver(mut self, resolver: fn(&str) -> Option<Ipv4Addr>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one full probe against `destination`.
    ///
    /// The socket is opened first, so a permission problem surfaces even for
    /// names that would not resolve. It is closed on every return path.
    pub fn probe_once(&self, destination: &str) -> Result<ProbeResult, PingError> {
        let mut socket = self.opener.open().map_err(PingError::from_socket_open)?;

        let address = (self.resolver)(destination)
            .ok_or_else(|| PingError::Resolution(destination.to_owned()))?;

        send(&mut socket, address, self.identifier, &self.clock)?;
        receive(&mut socket, self.identifier, &self.clock, self.timeout)
    }
}
