// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::delay::Delay;
use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use critical_section::Mutex;
use log::{info, warn, LevelFilter};
use panic_halt as _;

use hal::{
    gpio::{gpiod, Output, PushPull},
    i2c::{BlockingI2c, Mode},
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use pay_optical::config::BoardConfig;
use pay_optical::hw::{logger, Adc1, BoardPins, Compat, SpiSlave, Usart};
use pay_optical::pipeline::OpticalBoard;
use pay_optical::power::{AdcPowerMonitor, SensorRail};
use pay_optical::protocol::{with_link, Command, Dispatcher, Link, Mailbox, SharedLink};
use pay_optical::signal::Signal;

type ReadyPin = Compat<gpiod::PD0<Output<PushPull>>>;
type HostPort = SpiSlave<ReadyPin>;

static LINK: SharedLink<HostPort> = Mutex::new(RefCell::new(None));
static REQUESTS: Mailbox<Command> = Mailbox::new();

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();
    let config = BoardConfig::DEFAULT;

    // Clocks
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);

    // USART1 (DBG)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks, usart_cfg);
    if let Err(e) = logger::init(Usart::new(serial), LevelFilter::Info) {
        logger::write_raw(format_args!("logger not installed: {}\n", e));
    }

    // I2C1 (sensor bus)
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (pins.i2c1.scl, pins.i2c1.sda),
        Mode::standard(100.kHz()),
        &clocks,
        &mut rcc.apb1,
        50_000,
    );
    let delay = Delay::new(cp.SYST, clocks.sysclk().raw());

    // Sensor rail
    let load_switch = Signal::active_high(Compat(pins.power.load_switch)).unwrap();
    let mut rail = SensorRail::new(load_switch, &config.power);

    let mut board = OpticalBoard::new(Compat(i2c), Compat(delay), &config);
    if let Err(e) = rail.on(board.delay_mut()) {
        warn!("sensor rail: {:?}", e);
    }
    if let Err(e) = board.init() {
        warn!("board init failed: {:?}", e);
    }

    // Power monitor
    let adc = Adc1::new(dp.ADC1, config.power.adc_bits);
    let monitor = AdcPowerMonitor::new(adc, config.power);

    let mut dispatcher = Dispatcher::new(board, monitor, rail);

    // SPI1 (host link)
    let ready = Signal::active_low(Compat(pins.ready)).unwrap();
    let port = SpiSlave::spi1(dp.SPI1, pins.spi1, ready);
    critical_section::with(|cs| LINK.borrow(cs).replace(Some(Link::new(port))));
    unsafe { NVIC::unmask(pac::Interrupt::SPI1) };

    info!("waiting for host");

    loop {
        if !dispatcher.poll(&REQUESTS, &LINK) {
            cortex_m::asm::nop();
        }
    }
}

#[interrupt]
fn SPI1() {
    with_link(&LINK, |link| {
        link.on_interrupt(&REQUESTS);
        link.port_mut().clear_overrun();
    });
}
