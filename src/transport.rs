//! Default [`Transport`] implementations: a plain non-blocking TCP socket,
//! and (behind the `tls-native` feature) a `native-tls`-wrapped variant.
//!
//! Readiness is checked with a real, zero-timeout `poll(2)` call (via
//! `libc`), the same syscall the original engine's `connection_client_poll`
//! wrapped. A socket is only ever read after `poll` has confirmed it is
//! readable, so `read`'s `Ok(0)` means exactly one thing: the remote end
//! closed the connection.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::os::unix::io::{AsRawFd, RawFd};

use irc_interface::{PollInterest, Transport};

/// A single non-blocking `poll(2)` check on `fd` for the given interest.
/// `timeout = 0` makes this an immediate readiness probe rather than a
/// blocking wait, matching the engine's "no operation inside the engine
/// blocks" rule (see `SPEC_FULL.md` §5).
fn poll_fd(fd: RawFd, interest: PollInterest) -> io::Result<bool> {
    let events = match interest {
        PollInterest::Readable => libc::POLLIN,
        PollInterest::Writable => libc::POLLOUT,
    };
    let mut pollfd = libc::pollfd { fd, events, revents: 0 };
    let ready = unsafe { libc::poll(&mut pollfd, 1, 0) };
    if ready < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ready > 0 && pollfd.revents & events != 0)
}

/// A non-blocking TCP transport, the engine's default.
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Creates a transport with no connection yet established.
    pub fn new() -> TcpTransport {
        TcpTransport { stream: None }
    }

    fn stream_mut(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "not connected"))
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        TcpTransport::new()
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, host: &str, port: u16, tls: bool) -> io::Result<()> {
        if tls {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "plain TcpTransport cannot negotiate TLS; use TlsTransport",
            ));
        }
        let stream = TcpStream::connect((host, port))?;
        stream.set_nonblocking(true)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn poll(&mut self, interest: PollInterest) -> io::Result<bool> {
        match &self.stream {
            Some(stream) => poll_fd(stream.as_raw_fd(), interest),
            None => Ok(false),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_mut()?.read(buf)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stream_mut()?.write(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

/// A TLS-wrapped transport, available behind the `tls-native` feature.
#[cfg(feature = "tls-native")]
pub struct TlsTransport {
    stream: Option<native_tls::TlsStream<TcpStream>>,
}

#[cfg(feature = "tls-native")]
impl TlsTransport {
    /// Creates a transport with no connection yet established.
    pub fn new() -> TlsTransport {
        TlsTransport { stream: None }
    }

    fn stream_mut(&mut self) -> io::Result<&mut native_tls::TlsStream<TcpStream>> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "not connected"))
    }
}

#[cfg(feature = "tls-native")]
impl Default for TlsTransport {
    fn default() -> Self {
        TlsTransport::new()
    }
}

#[cfg(feature = "tls-native")]
impl Transport for TlsTransport {
    fn connect(&mut self, host: &str, port: u16, tls: bool) -> io::Result<()> {
        if !tls {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "TlsTransport requires tls = true",
            ));
        }
        let tcp = TcpStream::connect((host, port))?;
        let connector = native_tls::TlsConnector::new()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let tls_stream = connector
            .connect(host, tcp)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        tls_stream
            .get_ref()
            .set_nonblocking(true)?;
        self.stream = Some(tls_stream);
        Ok(())
    }

    fn poll(&mut self, interest: PollInterest) -> io::Result<bool> {
        match &self.stream {
            Some(stream) => poll_fd(stream.get_ref().as_raw_fd(), interest),
            None => Ok(false),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_mut()?.read(buf)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stream_mut()?.write(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}
