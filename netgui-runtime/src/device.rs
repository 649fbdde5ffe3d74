use std::io;
use std::time::Duration;

/// A raw Ethernet frame channel: every `recv` yields one whole frame, every `send` writes one, and
/// there is no extra framing header.
///
/// `recv` must not block. With nothing to read it fails with `io::ErrorKind::WouldBlock`, which
/// the pump treats as transient, as it does `Interrupted`. Every other error is fatal.
pub trait Device {
    /// Blocks for up to `timeout` until a frame can be read. Returns `Ok(false)` on timeout.
    fn poll_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Reads one frame into `buf`, returning its length.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes one frame, returning how many bytes the device accepted.
    fn send(&mut self, frame: &[u8]) -> io::Result<usize>;
}

/// True for the errors a non-blocking device reports when it merely has nothing for us yet.
pub fn is_transient(err: &io::Error) -> bool {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => true,
        _ => false,
    }
}
