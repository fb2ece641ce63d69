//! Active-low status LED driver.
//!
//! Holds the logical on/off boolean and the output pin together so the two
//! can never drift apart. The LED is wired between VCC and the pin, hence
//! logical "on" drives the pin LOW.

use esp_hal::gpio::{Level, Output};

use crate::domain::ports::LedStateHandler;

/// Pin level for a logical LED state.
pub(crate) const fn pin_level(on: bool) -> Level {
    if on { Level::Low } else { Level::High }
}

pub struct StatusLed {
    on: bool,
    pin: Output<'static>,
}

impl StatusLed {
    /// Take ownership of the output pin, starting with the LED off.
    pub fn new(mut pin: Output<'static>) -> Self {
        pin.set_level(pin_level(false));
        Self { on: false, pin }
    }
}

impl LedStateHandler for StatusLed {
    fn set_led(&mut self, on: bool) {
        self.on = on;
        self.pin.set_level(pin_level(on));
    }

    fn led_is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_level_is_the_complement_of_the_state() {
        assert_eq!(pin_level(true), Level::Low);
        assert_eq!(pin_level(false), Level::High);
    }
}
