//! USB composite device with one CDC-ACM function per channel.
//!
//! Each function is split into its OUT and IN halves and served by two
//! tasks. The OUT task feeds the channel's rx pipe and tracks the session
//! (DTR) and the requested line coding. DTR is re-read while the task waits
//! for rx pipe room, so a host that closes the port is seen as gone even if
//! its last packet never fit. The IN task sleeps until a writer
//! flushes, then pushes the tx pipe out in full-speed packets.

use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_time::{Duration, Timer};
use embassy_usb::class::cdc_acm::{self, CdcAcmClass, ParityType, Receiver, Sender, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use heapless::Vec;
use platform::config::{APP_NAME, NUM_CHANNELS, USB_PACKET_SIZE, USB_PID, USB_VID};
use platform::{LineCoding, Parity, StopBits};
use static_cell::StaticCell;

use crate::host_link::HostLink;
use crate::tasks::STORE;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

/// The RP2040 USB device driver.
pub type UsbDriver = Driver<'static, USB>;

/// How often the OUT task re-reads DTR and line coding while no data arrives.
const SESSION_POLL: Duration = Duration::from_millis(10);

const PACKET: usize = USB_PACKET_SIZE as usize;

static CONFIG_DESCRIPTOR: StaticCell<[u8; 512]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATES: StaticCell<[State<'static>; NUM_CHANNELS]> = StaticCell::new();

/// The built device and its CDC functions, in channel order.
pub struct UsbBridge {
    /// Device to run with [`usb_device_task`].
    pub device: UsbDevice<'static, UsbDriver>,
    /// One CDC-ACM function per channel.
    pub classes: Vec<CdcAcmClass<'static, UsbDriver>, NUM_CHANNELS>,
}

/// Build the composite device. Call once.
pub fn build(usb: USB) -> UsbBridge {
    let driver = Driver::new(usb, Irqs);

    let mut config = Config::new(USB_VID, USB_PID);
    config.manufacturer = Some("Raspberry Pi");
    config.product = Some(APP_NAME);
    config.serial_number = Some("BRIDGE01");
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    // Interface association descriptors so hosts bind one ACM driver per
    // function.
    config.device_class = 0xEF;
    config.device_sub_class = 0x02;
    config.device_protocol = 0x01;
    config.composite_with_iads = true;

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 512]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );

    let states = CDC_STATES.init(core::array::from_fn(|_| State::new()));
    let mut classes = Vec::new();
    for state in states.iter_mut() {
        let class = CdcAcmClass::new(&mut builder, state, USB_PACKET_SIZE);
        if classes.push(class).is_err() {
            break;
        }
    }

    UsbBridge {
        device: builder.build(),
        classes,
    }
}

/// Line coding as requested by the host, in the bridge's types.
pub fn host_line_coding(coding: &cdc_acm::LineCoding) -> LineCoding {
    LineCoding {
        data_rate: coding.data_rate(),
        data_bits: coding.data_bits(),
        parity: match coding.parity_type() {
            ParityType::None => Parity::None,
            ParityType::Odd => Parity::Odd,
            ParityType::Even => Parity::Even,
            ParityType::Mark => Parity::Mark,
            ParityType::Space => Parity::Space,
        },
        stop_bits: match coding.stop_bits() {
            cdc_acm::StopBits::One => StopBits::One,
            cdc_acm::StopBits::OnePointFive => StopBits::OnePointFive,
            cdc_acm::StopBits::Two => StopBits::Two,
        },
    }
}

/// Runs the USB device state machine.
#[embassy_executor::task]
pub async fn usb_device_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    device.run().await
}

/// OUT half of channel `index`: host bytes into the rx pipe, session state
/// and line coding into the store.
#[embassy_executor::task(pool_size = NUM_CHANNELS)]
pub async fn host_rx_task(
    index: usize,
    link: &'static HostLink,
    mut rx: Receiver<'static, UsbDriver>,
) -> ! {
    let mut packet = [0u8; PACKET];
    loop {
        rx.wait_connection().await;
        defmt::debug!("channel {} configured", index);

        loop {
            link.set_connected(rx.dtr());
            STORE.set_host_line_coding(index, host_line_coding(&rx.line_coding()));

            let event = select(rx.read_packet(&mut packet), Timer::after(SESSION_POLL)).await;
            match event {
                Either::First(Ok(n)) => {
                    let data = packet.get(..n).unwrap_or_default();
                    let kept = link.receive(data, || rx.dtr()).await;
                    if kept < n {
                        defmt::debug!("channel {} closed, {} host bytes dropped", index, n.saturating_sub(kept));
                    }
                }
                Either::First(Err(EndpointError::BufferOverflow)) => {
                    defmt::warn!("channel {} OUT packet overflow", index);
                }
                Either::First(Err(EndpointError::Disabled)) => break,
                Either::Second(()) => {}
            }
        }

        link.set_connected(false);
        defmt::debug!("channel {} deconfigured", index);
    }
}

/// IN half of a channel: pushes the tx pipe out on every flush.
#[embassy_executor::task(pool_size = NUM_CHANNELS)]
pub async fn host_tx_task(link: &'static HostLink, mut tx: Sender<'static, UsbDriver>) -> ! {
    let mut packet = [0u8; PACKET];
    loop {
        tx.wait_connection().await;
        loop {
            link.wait_flush().await;
            if !link.is_connected() {
                // left queued until the next session flushes
                continue;
            }
            match push_outgoing(link, &mut tx, &mut packet).await {
                Ok(()) | Err(EndpointError::BufferOverflow) => {}
                Err(EndpointError::Disabled) => break,
            }
        }
    }
}

async fn push_outgoing(
    link: &HostLink,
    tx: &mut Sender<'static, UsbDriver>,
    packet: &mut [u8; PACKET],
) -> Result<(), EndpointError> {
    let mut last = 0;
    loop {
        let n = link.take_outgoing(packet);
        if n == 0 {
            break;
        }
        tx.write_packet(packet.get(..n).unwrap_or_default()).await?;
        last = n;
    }
    // a full last packet needs a ZLP to end the transfer
    if last == PACKET {
        tx.write_packet(&[]).await?;
    }
    Ok(())
}
