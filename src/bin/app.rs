#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{
    clock::CpuClock,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    timer::timg::TimerGroup,
};
use esp_println::println;
use esp_storage::FlashStorage;
use static_cell::StaticCell;

use esp_led_portal::app::DeviceUsecases;
use esp_led_portal::config;
use esp_led_portal::controllers::{
    CREDENTIALS_SAVED,
    PortalHttpController,
    erase_credentials_and_restart,
    init_controllers,
};
use esp_led_portal::domain::ports::CredentialsReader as _;
use esp_led_portal::infrastructure::adapters::ResetButton;
use esp_led_portal::infrastructure::drivers::{
    NetMode,
    StatusLed,
    connect_or_start_portal,
};
use esp_led_portal::infrastructure::repositories::CredentialsRepository;
use esp_led_portal::infrastructure::tasks::{http_server_task, reset_button_task};
use esp_led_portal::{led_gpio, mk_static, reset_button_gpio};

esp_bootloader_esp_idf::esp_app_desc!();

static FLASH_STORAGE: StaticCell<FlashStorage<'static>> = StaticCell::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    // Allocate heap memory (64 + 32 KB)
    esp_alloc::heap_allocator!(
        #[unsafe(link_section = ".dram2_uninit")] size: 64 * 1024
    );
    esp_alloc::heap_allocator!(size: 32 * 1024);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // LED off at boot (active low); reset input idles LOW via pull-down
    let led = StatusLed::new(Output::new(
        led_gpio!(peripherals),
        Level::High,
        OutputConfig::default(),
    ));
    let reset_pin = Input::new(
        reset_button_gpio!(peripherals),
        InputConfig::default().with_pull(Pull::Down),
    );

    // Flash-backed credentials repository
    let flash = FLASH_STORAGE.init(FlashStorage::new(peripherals.FLASH));
    let flash_ptr = flash as *mut FlashStorage<'static>;
    let credentials = CredentialsRepository::new(flash_ptr);

    // One device-controller object, shared by the HTTP routes and the
    // button task through the controllers layer
    let usecases = mk_static!(
        DeviceUsecases<StatusLed, CredentialsRepository>,
        DeviceUsecases::new(led, credentials)
    );
    let stored = usecases.stored_credentials();
    init_controllers(usecases);

    // Boot-time reset window: a sustained hold here erases credentials
    // before provisioning ever runs
    let mut detector = ResetButton::new(config::RESET_BUTTON.hold_ms);
    let window_end = Instant::now()
        + Duration::from_millis(config::RESET_BUTTON.boot_window_ms);
    while Instant::now() < window_end {
        if detector.poll(reset_pin.is_high(), Instant::now().as_millis()) {
            println!("app: reset input held, erasing Wi-Fi credentials");
            erase_credentials_and_restart(Duration::from_millis(
                config::RESET_BUTTON.settle_ms,
            ))
            .await;
        }
        Timer::after(Duration::from_millis(
            config::RESET_BUTTON.poll_interval_ms,
        ))
        .await;
    }

    // Join the stored network or fall back to the configuration portal
    let net_mode =
        connect_or_start_portal(spawner, peripherals.WIFI, stored).await;

    // The detector keeps its state across the hand-off, so a hold spanning
    // the boot window keeps accumulating
    spawner.spawn(reset_button_task(reset_pin, detector)).ok();

    match net_mode {
        NetMode::Station(stack) => {
            let handler =
                mk_static!(PortalHttpController, PortalHttpController::new(false));
            spawner.spawn(http_server_task(stack, handler)).ok();

            if let Some(v4) = stack.config_v4() {
                println!(
                    "app: connected, control page at http://{}/",
                    v4.address.address()
                );
            }

            loop {
                Timer::after(Duration::from_secs(5)).await;
            }
        }
        NetMode::Portal(stack) => {
            let handler =
                mk_static!(PortalHttpController, PortalHttpController::new(true));
            spawner.spawn(http_server_task(stack, handler)).ok();

            println!(
                "app: portal up, join '{}' and open http://192.168.4.1/",
                config::PORTAL.ssid
            );

            let timeout = Timer::after(Duration::from_secs(
                config::PROVISIONING.portal_timeout_secs,
            ));
            match select(timeout, CREDENTIALS_SAVED.wait()).await {
                Either::First(()) => {
                    println!("app: provisioning portal timed out, restarting");
                    Timer::after(Duration::from_millis(
                        config::PROVISIONING.restart_delay_ms,
                    ))
                    .await;
                    esp_hal::system::software_reset()
                }
                Either::Second(()) => {
                    // The credentials handler reboots the device once its
                    // response has flushed
                    loop {
                        Timer::after(Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }
}
