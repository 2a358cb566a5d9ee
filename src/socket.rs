use std::io;
use std::mem;
use std::net::Ipv4Addr;
use std::ptr;
use std::time::Duration;

use log::debug;

/// The socket operations a probe needs. Implemented by [`RawSocket`] and by
/// scripted sockets in tests.
pub trait IcmpSocket {
    /// Sends one ICMP message to `destination`.
    fn send_to(&mut self, packet: &[u8], destination: Ipv4Addr) -> io::Result<()>;

    /// Blocks until a datagram can be read or `timeout` elapses. Returns
    /// `false` on timeout.
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Reads one datagram, IPv4 header included.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens a fresh socket for each probe.
pub trait SocketOpener {
    type Socket: IcmpSocket;

    fn open(&self) -> io::Result<Self::Socket>;
}

impl<F, S> SocketOpener for F
where
    F: Fn() -> io::Result<S>,
    S: IcmpSocket,
{
    type Socket = S;

    fn open(&self) -> io::Result<S> {
        self()
    }
}

/// An `AF_INET`/`SOCK_RAW`/`IPPROTO_ICMP` socket. The descriptor is closed
/// when the value is dropped.
#[derive(Debug)]
pub struct RawSocket {
    fd: libc::c_int,
}

impl RawSocket {
    pub fn open() -> io::Result<RawSocket> {
        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_RAW, libc::IPPROTO_ICMP) };
        if fd == -1 {
            return Err(io::Error::last_os_error());
        }
        if fd as usize >= libc::FD_SETSIZE {
            unsafe { libc::close(fd) };
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "socket descriptor is >= FD_SETSIZE",
            ));
        }
        debug!("opened raw ICMP socket fd={}", fd);
        Ok(RawSocket { fd })
    }
}

impl IcmpSocket for RawSocket {
    fn send_to(&mut self, packet: &[u8], destination: Ipv4Addr) -> io::Result<()> {
        let mut addr: libc::sockaddr_in = unsafe { mem::zeroed() };
        addr.sin_family = libc::AF_INET as libc::sa_family_t;
        // ICMP has no ports
        addr.sin_port = 1u16.to_be();
        addr.sin_addr = libc::in_addr {
            s_addr: u32::from(destination).to_be(),
        };

        let sent = unsafe {
            libc::sendto(
                self.fd,
                packet.as_ptr() as *const libc::c_void,
                packet.len(),
                0,
                &addr as *const libc::sockaddr_in as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
            )
        };
        if sent < 0 {
            return Err(io::Error::last_os_error());
        }
        if sent as usize != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {} of {} bytes", sent, packet.len()),
            ));
        }
        Ok(())
    }

    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        let mut tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };
        let mut readfds: libc::fd_set = unsafe { mem::zeroed() };
        unsafe {
            libc::FD_ZERO(&mut readfds);
            libc::FD_SET(self.fd, &mut readfds);
        }

        let ready = unsafe {
            libc::select(
                self.fd + 1,
                &mut readfds,
                ptr::null_mut(),
                ptr::null_mut(),
                &mut tv,
            )
        };
        match ready {
            -1 => Err(io::Error::last_os_error()),
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let received = unsafe {
            libc::recvfrom(
                self.fd,
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
                0,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if received < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(received as usize)
    }
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        debug!("closing raw ICMP socket fd={}", self.fd);
        unsafe { libc::close(self.fd) };
    }
}
