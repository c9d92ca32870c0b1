//! Cadence - Cooperative Superloop Firmware
//!
//! Main firmware binary for STM32F7 boards (reference: NUCLEO-F767ZI).
//! One execution context drives a TFT status panel, polls an I2C sensor,
//! streams telemetry to a collector and serves an operator console.
//!
//! Named for the fixed rhythm of the main loop: every service gets its
//! turn, none of them may hold the beat for long.
//!
//! # Wiring
//!
//! | Function        | Pins                      |
//! |-----------------|---------------------------|
//! | Panel SPI1      | PA5 SCK, PA7 MOSI         |
//! | Panel control   | PE11 CS, PE9 D/C, PF13 RST|
//! | Sensor I2C1     | PB8 SCL, PB9 SDA          |
//! | Console USART3  | PD8 TX, PD9 RX (ST-LINK)  |

#![no_std]
#![no_main]

use core::marker::PhantomData;

use cortex_m_rt::{entry, exception};
use defmt::*;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::{bind_interrupts, pac, peripherals};
use embassy_time::{Delay, Duration};
use embedded_hal::delay::DelayNs;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cadence_core::config::Config;
use cadence_core::display::panel;
use cadence_core::scheduler::{Board, MainLoop, Parts};
use cadence_core::snapshot::{BusSnapshots, SnapshotView};
use cadence_hal::i2c::I2cConfig;
use cadence_hal::{BusLines, Console, DisplayBus, I2cBus, NetStack, SpiDisplay};
use cadence_hal_stm32f7::{
    EmbassyClock, HalOutput, PacPin, SensorBus, SpiWriter, UartConsole, WfiIdle,
};

mod net;

use crate::net::UnlinkedStack;

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

/// Core clock after `embassy_stm32::init` with the default (HSI) setup;
/// only sets the SysTick wakeup rate
const CORE_HZ: u32 = 16_000_000;

/// Panel SPI clock; the bus divider caps it at half the APB clock
const PANEL_SPI_HZ: u32 = 8_000_000;

/// Console baud rate
const CONSOLE_BAUD: u32 = 115_200;

/// Bound on any single sensor transfer
const SENSOR_TIMEOUT_MS: u64 = 10;

bind_interrupts!(struct Irqs {
    USART3 => usart::BufferedInterruptHandler<peripherals::USART3>;
});

/// Decoder mailboxes; the broadcast-bus receive interrupt publishes here
static SNAPSHOTS: BusSnapshots = BusSnapshots::new();

// Static cells for UART ring buffers (must live forever)
static CONSOLE_TX: StaticCell<[u8; 512]> = StaticCell::new();
static CONSOLE_RX: StaticCell<[u8; 256]> = StaticCell::new();

/// Board description for whatever concrete drivers `start` is handed
struct Hw<D, S, N, C>(PhantomData<(D, S, N, C)>);

impl<D, S, N, C> Board for Hw<D, S, N, C>
where
    D: DisplayBus,
    S: I2cBus + BusLines,
    N: NetStack,
    C: Console,
{
    type Display = D;
    type Sensor = S;
    type Delay = Delay;
    type Net = N;
    type Console = C;
    type Snapshots = SnapshotView<'static>;
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Cadence firmware starting...");

    let config = board_config();
    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    let Some(core) = cortex_m::Peripherals::take() else {
        defmt::panic!("core peripherals already taken");
    };
    let idle = WfiIdle::new(core.SYST, CORE_HZ);
    let mut delay = Delay;

    // Panel: hardware reset, then the wake-up sequence
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(PANEL_SPI_HZ);
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PA5, p.PA7, spi_config);
    let cs = Output::new(p.PE11, Level::High, Speed::VeryHigh);
    let dc = Output::new(p.PE9, Level::Low, Speed::VeryHigh);
    let mut rst = Output::new(p.PF13, Level::High, Speed::Low);
    rst.set_low();
    delay.delay_ms(10);
    rst.set_high();
    delay.delay_ms(120);

    let mut display = SpiDisplay::new(
        SpiWriter::new(spi),
        HalOutput::new(cs, true),
        HalOutput::new(dc, false),
    );
    match panel::init(&mut display, &mut delay) {
        Ok(()) => info!("Panel initialized"),
        Err(e) => error!("Panel init failed: {:?}", e),
    }

    // Sensor bus
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = Hertz(I2cConfig::STANDARD.frequency);
    i2c_config.timeout = Duration::from_millis(SENSOR_TIMEOUT_MS);
    let i2c = I2c::new_blocking(p.I2C1, p.PB8, p.PB9, i2c_config);
    let sensor = SensorBus::new(
        i2c,
        pac::I2C1,
        PacPin::new(pac::GPIOB, 8),
        PacPin::new(pac::GPIOB, 9),
    );

    // Console on the ST-LINK virtual COM port
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = CONSOLE_BAUD;
    let uart = match BufferedUart::new(
        p.USART3,
        p.PD9, // RX
        p.PD8, // TX
        CONSOLE_TX.init([0; 512]),
        CONSOLE_RX.init([0; 256]),
        Irqs,
        uart_config,
    ) {
        Ok(uart) => uart,
        Err(e) => defmt::panic!("console uart config rejected: {:?}", e),
    };
    let console = UartConsole::new(uart);

    start(display, sensor, UnlinkedStack, console, &config, idle)
}

/// Build the main loop around the drivers and never return
fn start<D, S, N, C>(
    display: D,
    sensor: S,
    net: N,
    console: C,
    config: &Config,
    mut idle: WfiIdle,
) -> !
where
    D: DisplayBus,
    S: I2cBus + BusLines,
    N: NetStack,
    C: Console,
{
    let parts: Parts<Hw<D, S, N, C>> = Parts {
        display,
        sensor,
        delay: Delay,
        net,
        console,
        snapshots: SNAPSHOTS.view(config.snapshot.freshness_ms),
    };

    let mut main_loop = match MainLoop::new(parts, config) {
        Ok(main_loop) => main_loop,
        Err(e) => defmt::panic!("board config rejected: {}", e),
    };

    info!("Entering main loop");
    main_loop.run(&EmbassyClock, &mut idle)
}

/// Wakeup only; see [`WfiIdle`]
#[exception]
fn SysTick() {}
