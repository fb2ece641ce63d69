//! Reset Button Task
//!
//! Polls the reset input and performs the credential erase + restart once
//! the long-press detector reports a trigger. Takes over the detector
//! instance that already ran through the boot-time window.

use embassy_time::{Duration, Instant, Timer};
use esp_hal::gpio::Input;
use esp_println::println;

use crate::config;
use crate::controllers::erase_credentials_and_restart;
use crate::infrastructure::adapters::ResetButton;

#[embassy_executor::task]
pub async fn reset_button_task(pin: Input<'static>, mut detector: ResetButton) {
    let poll_interval = Duration::from_millis(config::RESET_BUTTON.poll_interval_ms);

    loop {
        if detector.poll(pin.is_high(), Instant::now().as_millis()) {
            println!(
                "reset_button: input held for {}ms, erasing Wi-Fi credentials",
                config::RESET_BUTTON.hold_ms
            );
            erase_credentials_and_restart(Duration::from_millis(
                config::RESET_BUTTON.settle_ms,
            ))
            .await;
        }
        Timer::after(poll_interval).await;
    }
}
