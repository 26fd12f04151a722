//! Pico sample bridge - main entry point
//!
//! Hardware-only entry point for the RP2040 (Raspberry Pi Pico).
//! See `firmware::boot::BOOT_SEQUENCE_STEPS` for the ordered sequence.

#![no_std]
#![no_main]

use bridge::{CaptureConfig, CaptureLoop, ChannelRoles, DiagLog, InitError, SampleCapture};
use cortex_m_rt::entry;
use embassy_executor::{Executor, SpawnError, Spawner};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{PIN_25, USB};
use embassy_rp::Peripherals;
use embassy_time::{Duration, Timer};
use firmware::adc::CaptureAdc;
use firmware::dma::DmaPool;
use firmware::host_link::{host_channel, HOST_LINKS};
use firmware::tasks::{peer_task, pump_task, STORE};
use firmware::usb;
use platform::config::{
    boot_banner, ADC_SETTLE_MS, APP_NAME, APP_VERSION, BUFFER_SIZE, NUM_CHANNELS, N_SAMPLES,
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();
static CORE1_STACK: StaticCell<Stack<8192>> = StaticCell::new();

#[entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());
    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| spawn_or_log(spawner.spawn(core0_task(p)), "core0"))
}

fn spawn_or_log(result: Result<(), SpawnError>, name: &str) {
    if result.is_err() {
        defmt::error!("failed to spawn {} task", name);
    }
}

/// Report a failed init step and park core 0. Core 1 is never started.
async fn halt(err: InitError) -> ! {
    defmt::error!("init failed: {}", err);
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

#[embassy_executor::task]
async fn core0_task(p: Peripherals) {
    defmt::info!("{} v{}", APP_NAME, APP_VERSION);
    defmt::info!("{}", boot_banner());

    // Step 2: the status LED pin is borrowed for the blink and handed to
    // the pump on core 1 afterwards.
    let mut status_pin = p.PIN_25;
    {
        let mut led = Output::new(&mut status_pin, Level::Low);
        firmware::boot::hardware::blink_status(&mut led).await;
    }

    let roles = match ChannelRoles::DEFAULT.validate(NUM_CHANNELS) {
        Ok(roles) => roles,
        Err(err) => halt(err).await,
    };
    let config = match CaptureConfig::DEFAULT.validate(N_SAMPLES) {
        Ok(config) => config,
        Err(err) => halt(err).await,
    };
    defmt::info!(
        "{} channels, {} byte buffers, sample channel {}, diag channel {}",
        NUM_CHANNELS,
        BUFFER_SIZE,
        roles.sample,
        roles.diag
    );

    // Step 3: ADC
    let adc = match CaptureAdc::new(p.ADC, p.PIN_26, &config) {
        Ok(adc) => adc,
        Err(err) => halt(err).await,
    };

    // Step 4: settle
    Timer::after(Duration::from_millis(ADC_SETTLE_MS)).await;

    // Step 5: DMA
    let mut pool = DmaPool::new();
    pool.give(p.DMA_CH0);
    pool.give(p.DMA_CH1);
    pool.give(p.DMA_CH2);
    pool.give(p.DMA_CH3);
    let busy = Output::new(p.PIN_15, Level::Low);
    let capture = match SampleCapture::claim(&mut pool, adc, busy, &config) {
        Ok(capture) => capture,
        Err(err) => halt(err).await,
    };

    let (Some(output), Some(diag)) = (host_channel(roles.sample), host_channel(roles.diag)) else {
        halt(InitError::ChannelOutOfRange {
            index: roles.sample.max(roles.diag),
            count: NUM_CHANNELS,
        })
        .await
    };

    // Step 6: core 1. USB interrupts are enabled on the core that creates
    // the driver, so the device is built over there.
    let usb = p.USB;
    spawn_core1(p.CORE1, CORE1_STACK.init_with(Stack::new), move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| core1_main(spawner, usb, status_pin, roles))
    });

    // Step 7: capture loop
    defmt::info!("capture loop on core 0, {} samples per frame", N_SAMPLES);
    let mut capture_loop: CaptureLoop<'_, _, _, _, _, _, N_SAMPLES> =
        CaptureLoop::new(capture, output, DiagLog::new(diag), STORE.stats());
    capture_loop.run().await
}

fn core1_main(spawner: Spawner, usb: USB, status_pin: PIN_25, roles: ChannelRoles) {
    let parts = usb::build(usb);
    spawn_or_log(spawner.spawn(usb::usb_device_task(parts.device)), "usb");

    for (index, (class, link)) in parts.classes.into_iter().zip(HOST_LINKS.iter()).enumerate() {
        let (tx, rx) = class.split();
        spawn_or_log(spawner.spawn(usb::host_rx_task(index, link, rx)), "host rx");
        spawn_or_log(spawner.spawn(usb::host_tx_task(link, tx)), "host tx");
    }

    let status_led = Output::new(status_pin, Level::Low);
    spawn_or_log(spawner.spawn(pump_task(status_led)), "pump");
    spawn_or_log(spawner.spawn(peer_task(roles)), "peer");
    defmt::info!("core 1 running USB, pump and peers");
}
