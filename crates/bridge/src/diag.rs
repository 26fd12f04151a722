//! Diagnostic text log on a host channel.
//!
//! Each message is formatted into a fixed line buffer and written straight
//! to the channel's host port, then flushed. Nothing is queued: with no
//! host session attached the message is dropped. Messages longer than the
//! line buffer are cut at a character boundary.

use core::fmt::{self, Write as _};

use platform::config::DIAG_LINE_CAPACITY;
use platform::HostPort;

/// Best-effort text logger writing to one host channel.
pub struct DiagLog<P, const LINE: usize = DIAG_LINE_CAPACITY> {
    port: P,
    line: TruncatingLine<LINE>,
}

impl<P: HostPort, const LINE: usize> DiagLog<P, LINE> {
    /// Log to `port`.
    pub fn new(port: P) -> Self {
        Self {
            port,
            line: TruncatingLine::new(),
        }
    }

    /// Format `args` and send it. Returns the number of bytes the port
    /// accepted, `0` when no host is attached.
    pub fn log(&mut self, args: fmt::Arguments<'_>) -> usize {
        if !self.port.is_connected() {
            return 0;
        }
        self.line.clear();
        // TruncatingLine never reports an error, it cuts instead.
        let _ = self.line.write_fmt(args);
        let written = self.port.write(self.line.as_bytes());
        self.port.flush();
        written
    }

    /// Whether the last formatted message was cut.
    pub fn last_truncated(&self) -> bool {
        self.line.truncated
    }

    /// The underlying host port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the underlying host port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

/// Write a formatted line to a [`DiagLog`].
///
/// ```ignore
/// diag!(log, "frame {} of {}\r\n", n, total);
/// ```
#[macro_export]
macro_rules! diag {
    ($log:expr, $($arg:tt)*) => {
        $log.log(::core::format_args!($($arg)*))
    };
}

struct TruncatingLine<const N: usize> {
    buf: heapless::String<N>,
    truncated: bool,
}

impl<const N: usize> TruncatingLine<N> {
    fn new() -> Self {
        Self {
            buf: heapless::String::new(),
            truncated: false,
        }
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }
}

impl<const N: usize> fmt::Write for TruncatingLine<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let room = N.saturating_sub(self.buf.len());
        let mut cut = s.len().min(room);
        while !s.is_char_boundary(cut) {
            cut = cut.saturating_sub(1);
        }
        if cut < s.len() {
            self.truncated = true;
        }
        if let Some(head) = s.get(..cut) {
            if self.buf.push_str(head).is_err() {
                self.truncated = true;
            }
        }
        Ok(())
    }
}
