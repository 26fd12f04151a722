//! Capture Scheduling Loop
//!
//! Runs alone on its own core. Every iteration checks the sample channel:
//! with no host attached it does nothing at all, otherwise it runs one
//! capture cycle and writes the finished frame straight to the sample
//! channel's host port in a single write, then flushes. The channel store
//! is not involved; the frame buffer belongs to this loop only.
//!
//! Frames carry no header, so the host finds boundaries by counting bytes.
//! A frame is therefore queued whole or not at all: when the transmit FIFO
//! has less room than a frame, the frame is dropped and counted.

use embassy_futures::yield_now;
use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use platform::{HostPort, PacedTransfer, PacingPeripheral};

use crate::capture::SampleCapture;
use crate::diag::DiagLog;
use crate::stats::Stats;

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Sample channel not connected; nothing was triggered.
    Idle,
    /// A frame was captured and handed to the host port.
    Captured {
        /// Bytes the port accepted
        written: usize,
    },
    /// A frame was captured but the host port had no room for all of it.
    Dropped {
        /// Frame length
        bytes: usize,
    },
}

/// Triggers captures and forwards frames of `FRAME` bytes.
pub struct CaptureLoop<'a, E, A, B, P, D, const FRAME: usize> {
    capture: SampleCapture<E, A, B>,
    output: P,
    diag: DiagLog<D>,
    stats: &'a Stats,
    frame: [u8; FRAME],
    connected: bool,
}

impl<'a, E, A, B, P, D, const FRAME: usize> CaptureLoop<'a, E, A, B, P, D, FRAME>
where
    E: PacedTransfer,
    A: PacingPeripheral,
    B: OutputPin<Error = Infallible>,
    P: HostPort,
    D: HostPort,
{
    /// `output` is the sample channel's host port, `diag` the text log.
    pub fn new(
        capture: SampleCapture<E, A, B>,
        output: P,
        diag: DiagLog<D>,
        stats: &'a Stats,
    ) -> Self {
        Self {
            capture,
            output,
            diag,
            stats,
            frame: [0; FRAME],
            connected: false,
        }
    }

    /// One iteration: idle, or capture and forward one frame.
    pub async fn run_once(&mut self) -> CycleOutcome {
        let connected = self.output.is_connected();
        if connected != self.connected {
            self.connected = connected;
            if connected {
                info!("sample channel connected, streaming {} byte frames", FRAME);
                crate::diag!(self.diag, "sample stream on, {} bytes per frame\r\n", FRAME);
            } else {
                info!("sample channel disconnected, capture idle");
                crate::diag!(self.diag, "sample stream off\r\n");
            }
        }
        if !connected {
            return CycleOutcome::Idle;
        }

        let captured = self.capture.capture(&mut self.frame).await;
        self.stats.record_capture();

        let room = self.output.free_capacity();
        if room < captured {
            self.stats.record_dropped(captured);
            // keep pushing out what is already queued
            self.output.flush();
            warn!("sample frame dropped, {} bytes with {} free", captured, room);
            crate::diag!(self.diag, "frame dropped: {} bytes, {} free\r\n", captured, room);
            return CycleOutcome::Dropped { bytes: captured };
        }

        let written = self
            .frame
            .get(..captured)
            .map_or(0, |frame| self.output.write(frame));
        self.output.flush();

        if written < captured {
            // only reachable if another writer shares the sample channel
            let dropped = captured.saturating_sub(written);
            self.stats.record_dropped(dropped);
            error!("sample frame cut, {} of {} bytes queued", written, captured);
        }

        CycleOutcome::Captured { written }
    }

    /// Loop forever. Idle iterations yield so the executor stays live.
    pub async fn run(&mut self) -> ! {
        loop {
            match self.run_once().await {
                CycleOutcome::Idle | CycleOutcome::Dropped { .. } => yield_now().await,
                CycleOutcome::Captured { .. } => {}
            }
        }
    }

    /// The capture engine.
    pub fn capture(&self) -> &SampleCapture<E, A, B> {
        &self.capture
    }

    /// The sample channel's host port.
    pub fn output(&self) -> &P {
        &self.output
    }

    /// Mutable access to the sample channel's host port.
    pub fn output_mut(&mut self) -> &mut P {
        &mut self.output
    }

    /// The diagnostic log.
    pub fn diag(&self) -> &DiagLog<D> {
        &self.diag
    }

    /// Mutable access to the diagnostic log.
    pub fn diag_mut(&mut self) -> &mut DiagLog<D> {
        &mut self.diag
    }
}
