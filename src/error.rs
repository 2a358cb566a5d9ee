use std::error::Error;
use std::fmt;
use std::io;

/// Errors that can end a single probe or a whole run.
///
/// A probe that goes unanswered is not an error, see
/// [`ProbeResult::Timeout`](crate::probe::ProbeResult::Timeout).
#[derive(Debug)]
pub enum PingError {
    /// Creating the raw socket was denied. No probe in the run can succeed.
    Permission(io::Error),

    /// The destination could not be resolved to an IPv4 address.
    Resolution(String),

    /// A socket syscall other than the bounded wait failed.
    Transport(io::Error),

    /// The echo request could not be encoded.
    Codec(bincode::Error),

    /// Writing to the console failed.
    Io(io::Error),
}

impl PingError {
    /// Classifies a failure to create the raw socket.
    pub fn from_socket_open(e: io::Error) -> Self {
        let denied = e.kind() == io::ErrorKind::PermissionDenied
            || matches!(e.raw_os_error(), Some(libc::EPERM) | Some(libc::EACCES));
        if denied {
            PingError::Permission(e)
        } else {
            PingError::Transport(e)
        }
    }

    /// Whether this error makes every later probe in the run pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(*self, PingError::Permission(..) | PingError::Io(..))
    }
}

impl From<bincode::Error> for PingError {
    fn from(e: bincode::Error) -> Self {
        PingError::Codec(e)
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use PingError::*;
        match *self {
            Permission(ref e) => write!(
                fmt,
                "{}. ICMP messages can only be sent from processes running as root.",
                e
            ),
            Resolution(ref host) => write!(fmt, "cannot resolve hostname {}", host),
            Transport(ref e) => write!(fmt, "socket error: {}", e),
            Codec(ref e) => write!(fmt, "encoding error: {}", e),
            Io(ref e) => write!(fmt, "output error: {}", e),
        }
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use PingError::*;
        match *self {
            Permission(ref e) | Transport(ref e) | Io(ref e) => Some(e),
            Codec(ref e) => Some(&**e),
            Resolution(..) => None,
        }
    }
}
