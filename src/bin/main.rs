#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::peripherals::{PIO0, UART0, UART1};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartTx};
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;

use compass_core::heading::Declination;
use compass_core::pipeline::DEFAULT_SMOOTHING_STEPS;
use compass_core::services::load_or_default;
use compass_core::{Boot, Context, HeadingPipeline, Magnetometer, SmoothingFilter, StateMachine};
use magnetometer::AnyMagnetometer;
use mcompass::shared::SharedPipeline;
use mcompass::storage::FLASH_SIZE;
use mcompass::tasks;
use mcompass::tasks::led::Leds;
use mcompass::{FirmwareBoard, FlashStorage, LineReader, FIRST_BOOT_MODEL};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => embassy_rp::uart::InterruptHandler<UART0>;
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

/// Magnetic declination at the deployment site.
const DECLINATION: Declination = Declination::from_arc_minutes(0);

/// Heading pipeline shared by the sensor task and the calibration sweep.
static PIPELINE: StaticCell<SharedPipeline> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("mcompass starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Settings ---
    let flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
    let mut storage = FlashStorage::new(flash);
    let settings = load_or_default(&mut storage, FIRST_BOOT_MODEL);

    // --- Magnetometer ---
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = 400_000;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);

    let sensor = match AnyMagnetometer::detect(i2c, Delay) {
        Ok(sensor) => {
            info!("magnetometer {:?} found", sensor.model());
            Some(sensor)
        }
        Err(e) => {
            error!("no magnetometer: {:?}", e);
            None
        }
    };
    let sensor_model = sensor.as_ref().map(|s| s.model());
    let pipeline = sensor.map(|sensor| {
        let mut pipeline = HeadingPipeline::new(
            sensor,
            SmoothingFilter::new(DEFAULT_SMOOTHING_STEPS, true),
            DECLINATION,
        );
        if !pipeline.restore_calibration(settings.calibration) {
            warn!("no usable calibration stored, using identity");
        }
        pipeline
    });
    let pipeline = PIPELINE.init(Mutex::new(pipeline));

    // --- Button (held at power-up requests calibration) ---
    let button = Input::new(p.PIN_15, Pull::Up);
    Timer::after_millis(20).await;
    let boot = if sensor_model.is_none() {
        Boot::SensorMissing
    } else if button.is_low() {
        Boot::CalibrateRequested
    } else {
        Boot::Normal
    };

    // --- Console UART ---
    let mut console_config = UartConfig::default();
    console_config.baudrate = 115_200;
    let console = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        console_config,
    );
    let (console_tx, console_rx) = console.split();

    // --- GPS UART ---
    let mut gps_config = UartConfig::default();
    gps_config.baudrate = 9_600;
    let gps = Uart::new(
        p.UART0,
        p.PIN_0, // TX
        p.PIN_1, // RX
        Irqs,
        p.DMA_CH3,
        p.DMA_CH4,
        gps_config,
    );
    let (_gps_tx, gps_rx) = gps.split();
    let gps_power = Output::new(p.PIN_2, Level::High);

    // --- LED matrix ---
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let leds = PioWs2812::new(&mut common, sm0, p.DMA_CH2, p.PIN_16, &program);

    // --- State machine ---
    let model = settings.model;
    let ctx = Context::new(settings, sensor_model);
    let pointer = settings.colors.for_work_type(ctx.work_type);
    let board = FirmwareBoard::new(storage, pipeline, pointer);
    let machine = StateMachine::new(ctx, board);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(led_task(leds).unwrap());
    spawner.spawn(info_task().unwrap());
    spawner.spawn(dispatcher_task(machine, boot).unwrap());
    if sensor_model.is_some() {
        spawner.spawn(sensor_task(pipeline).unwrap());
    }
    spawner.spawn(nether_task().unwrap());
    spawner.spawn(button_task(button).unwrap());
    spawner.spawn(console_task(LineReader::new(console_rx), console_tx).unwrap());
    if model == compass_core::Model::Gps {
        spawner.spawn(gps_task(LineReader::new(gps_rx), gps_power).unwrap());
    } else {
        info!("lite model, GPS receiver not used");
    }

    info!("mcompass initialized ({:?})", boot);
}

/// Sensor task - polls the heading pipeline and posts azimuths.
#[embassy_executor::task]
async fn sensor_task(pipeline: &'static SharedPipeline) {
    tasks::sensor::run(pipeline).await;
}

/// Nether task - wandering needle while there is no fix.
#[embassy_executor::task]
async fn nether_task() {
    tasks::nether::run().await
}

/// Button task - gesture detection.
#[embassy_executor::task]
async fn button_task(pin: Input<'static>) {
    tasks::button::run(pin).await
}

/// GPS task - NMEA fixes and receiver duty cycle.
#[embassy_executor::task]
async fn gps_task(reader: LineReader<'static>, power: Output<'static>) {
    tasks::gps::run(reader, power).await
}

/// Console task - configuration commands.
#[embassy_executor::task]
async fn console_task(reader: LineReader<'static>, tx: UartTx<'static, Async>) {
    tasks::console::run(reader, tx).await
}

/// LED task - draws render requests.
#[embassy_executor::task]
async fn led_task(leds: Leds) {
    tasks::led::run(leds).await
}

/// Info expiry task - closes Info screens.
#[embassy_executor::task]
async fn info_task() {
    tasks::info::run().await
}

/// Dispatcher task - owns the state machine.
#[embassy_executor::task]
async fn dispatcher_task(machine: StateMachine<FirmwareBoard>, boot: Boot) {
    tasks::dispatcher::run(machine, boot).await
}
