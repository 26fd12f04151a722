//! Host transport and peer abstractions
//!
//! Both sides of a channel are polled, never awaited: every call returns
//! immediately with however many bytes could be moved. A caller that gets
//! zero simply tries again on its next tick.

/// One virtual serial channel as seen from the device towards the host.
///
/// Mirrors the FIFO interface of a CDC-ACM stack: received bytes wait in a
/// receive FIFO until read, written bytes wait in a transmit FIFO until
/// flushed.
pub trait HostPort {
    /// Whether a host session is attached to this channel.
    fn is_connected(&self) -> bool;

    /// Bytes received from the host and not yet read.
    fn available(&self) -> usize;

    /// Move up to `buf.len()` received bytes into `buf`.
    ///
    /// Returns the number of bytes moved.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Queue `data` for transmission.
    ///
    /// Returns the number of bytes accepted; the rest is not queued.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Room left in the transmit FIFO. A write of at most this many bytes
    /// is accepted whole. Zero while no host session is attached.
    fn free_capacity(&self) -> usize;

    /// Push queued bytes out to the host.
    fn flush(&mut self);
}

/// The far side of a bridge channel (for example a UART driver).
///
/// Drains bytes the host sent and produces bytes for the host.
pub trait PeerPort {
    /// Move up to `buf.len()` bytes produced by the peer into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Hand `data` to the peer. Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> usize;
}

impl<T: HostPort + ?Sized> HostPort for &mut T {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn available(&self) -> usize {
        (**self).available()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> usize {
        (**self).write(data)
    }

    fn free_capacity(&self) -> usize {
        (**self).free_capacity()
    }

    fn flush(&mut self) {
        (**self).flush();
    }
}
