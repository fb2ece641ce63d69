mod http;
mod pages;

pub use http::PortalHttpController;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use esp_println::println;

use crate::domain::ports::{DeviceControlPort, DeviceControlPortRef};

pub(crate) static DEVICE_USECASES: Mutex<
    CriticalSectionRawMutex,
    RefCell<Option<DeviceControlPortRef>>,
> = Mutex::new(RefCell::new(None));

/// Raised when the provisioning API stores new credentials; releases the
/// portal-timeout watchdog in `main`.
pub static CREDENTIALS_SAVED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Install the device usecases before any controller runs.
pub fn init_controllers(usecases: DeviceControlPortRef) {
    DEVICE_USECASES.lock(|cell| {
        cell.borrow_mut().replace(usecases);
    });
}

/// Run a closure against the shared device usecases.
pub(crate) fn with_usecases<R>(
    f: impl FnOnce(&mut dyn DeviceControlPort) -> R,
) -> R {
    DEVICE_USECASES.lock(|cell| {
        let mut cell = cell.borrow_mut();
        let usecases = cell.as_mut().unwrap();
        f(&mut **usecases)
    })
}

/// Shared terminal action for both reset paths (long press and `/reset`):
/// erase the stored credentials, let things settle, reboot into the
/// provisioning flow.
pub async fn erase_credentials_and_restart(settle: Duration) -> ! {
    if with_usecases(|usecases| usecases.erase_credentials()).is_err() {
        println!("controllers: credential erase failed, restarting anyway");
    }
    Timer::after(settle).await;
    esp_hal::system::software_reset()
}
