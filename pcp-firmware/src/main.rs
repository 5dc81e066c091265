//! Pico Color Picker firmware
//!
//! Main firmware binary for the RP2040 color picker: three rotary encoders
//! with push switches, two navigation buttons, an SSD1306 OLED and three
//! WS2812 LEDs.
//!
//! Pin map of the reference board:
//!
//! ```text
//!  GPIO2..9    encoders (PIO0 SM0)
//!  GPIO10..17  buttons  (PIO0 SM1)
//!  GPIO20/21   OLED SDA/SCL (I2C0)
//!  GPIO22      LED data (PIO1 SM0)
//! ```

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{I2C0, PIO0, PIO1};
use embassy_rp::pio::Pio;
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use pcp_core::apps;
use pcp_core::bridge::Bridge;
use pcp_core::config::{parse_device, DeviceConfig};
use pcp_core::render::Layout;
use pcp_display::Ssd1306;
use pcp_hal_rp2040::{InputSampler, SamplerProgram, Ws2812};

use crate::channels::{BUS, BUTTON_MAILBOX, ENCODER_MAILBOX, NAV, PALETTE};

mod channels;
mod tasks;

// Heap allocator for contexts and their handlers
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 16KB
const HEAP_SIZE: usize = 16 * 1024;

/// Board description compiled into the firmware
/// Edit device.toml and rebuild to customize
const DEVICE_CONFIG: &str = include_str!("../device.toml");

/// OLED bus speed
const I2C_FREQUENCY: u32 = 400_000;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    PIO1_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO1>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// Executor for the input bridges, preempting the thread-mode tasks
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("pcp firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_device_config();
    let controls = unwrap!(config.controls());
    PALETTE.apply(&config.palette);
    info!("Configuration loaded");

    // Build every screen and open the main menu
    {
        let mut nav = NAV.lock().await;
        let apps = apps::build(&mut nav, &PALETTE, &controls);
        nav.push(apps.main, None, &BUS);
        info!("Screens built: {}", apps);
    }

    // Setup PIO0 for input sampling
    // Encoders on GPIO2..9, buttons on GPIO10..17
    let Pio {
        mut common,
        sm0,
        sm1,
        ..
    } = Pio::new(p.PIO0, Irqs);

    let program = SamplerProgram::new(&mut common);
    let encoder_pins = [
        common.make_pio_pin(p.PIN_2),
        common.make_pio_pin(p.PIN_3),
        common.make_pio_pin(p.PIN_4),
        common.make_pio_pin(p.PIN_5),
        common.make_pio_pin(p.PIN_6),
        common.make_pio_pin(p.PIN_7),
        common.make_pio_pin(p.PIN_8),
        common.make_pio_pin(p.PIN_9),
    ];
    let button_pins = [
        common.make_pio_pin(p.PIN_10),
        common.make_pio_pin(p.PIN_11),
        common.make_pio_pin(p.PIN_12),
        common.make_pio_pin(p.PIN_13),
        common.make_pio_pin(p.PIN_14),
        common.make_pio_pin(p.PIN_15),
        common.make_pio_pin(p.PIN_16),
        common.make_pio_pin(p.PIN_17),
    ];
    let encoder_sampler = InputSampler::new(&program, sm0, encoder_pins);
    let button_sampler = InputSampler::new(&program, sm1, button_pins);

    info!("PIO input samplers initialized");

    // Setup PIO1 for the LED chain on GPIO22
    let Pio {
        common: mut led_common,
        sm0: led_sm,
        ..
    } = Pio::new(p.PIO1, Irqs);
    let chain = Ws2812::new(&mut led_common, led_sm, p.PIN_22);

    info!("PIO LED chain initialized");

    // Setup I2C0 for the OLED (SDA=GPIO20, SCL=GPIO21)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let i2c = I2c::new_async(p.I2C0, p.PIN_21, p.PIN_20, Irqs, i2c_config);
    let display = Ssd1306::new(i2c);

    info!("I2C display initialized");

    // Bridges run at interrupt priority so sampling never waits on UI work
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner_high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);

    spawner_high
        .spawn(tasks::encoder_bridge_task(
            Bridge::new(config.encoder_bank(), &ENCODER_MAILBOX),
            encoder_sampler,
        ))
        .unwrap();
    spawner_high
        .spawn(tasks::button_bridge_task(
            Bridge::new(config.button_bank(), &BUTTON_MAILBOX),
            button_sampler,
        ))
        .unwrap();

    // Spawn thread-mode tasks
    spawner.spawn(tasks::encoder_dispatch_task()).unwrap();
    spawner.spawn(tasks::button_dispatch_task()).unwrap();
    spawner
        .spawn(tasks::render_task(display, Layout::new(&controls)))
        .unwrap();
    spawner.spawn(tasks::led_task(chain)).unwrap();

    info!("All tasks spawned, firmware running");

    // Keeps the PIO common blocks alive; all work happens in spawned tasks
    let _pio = (common, led_common);
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Parse the embedded board description
///
/// build.rs already rejects a broken device.toml, so the fallback only
/// matters when the two validators disagree.
fn load_device_config() -> DeviceConfig {
    match parse_device(DEVICE_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using reference board defaults");
            DeviceConfig::default()
        }
    }
}
