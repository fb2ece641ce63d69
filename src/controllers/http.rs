use embassy_time::{Duration, Timer};
use esp_println::println;
use heapless::String;

use super::{
    CREDENTIALS_SAVED,
    erase_credentials_and_restart,
    pages,
    with_usecases,
};
use crate::{
    config,
    domain::{
        dto::{CredentialsDto, DeviceStatus},
        entity::WifiCredentials,
    },
    net::http::{
        HttpConnection,
        HttpHandler,
        HttpMethod,
        HttpResult,
        ResponseHeaders,
    },
};

/// Route controller for the control page and the captive portal.
///
/// `portal` records whether the device is serving its own access point;
/// the page then carries the Wi-Fi setup form.
#[derive(Debug)]
pub struct PortalHttpController {
    portal: bool,
}

impl PortalHttpController {
    pub fn new(portal: bool) -> Self {
        Self { portal }
    }
}

impl HttpHandler for PortalHttpController {
    async fn handle_request(&self, conn: HttpConnection<'_>) -> HttpResult {
        let mut conn = conn;
        match conn.route() {
            (HttpMethod::Get, "/led/on") => handle_set_led(&mut conn, true).await,
            (HttpMethod::Get, "/led/off") => {
                handle_set_led(&mut conn, false).await
            }
            (_, "/reset") => handle_reset(&mut conn).await,
            (HttpMethod::Post, "/api/credentials") => {
                handle_save_credentials(&mut conn).await
            }
            (HttpMethod::Get, "/api/status") => {
                handle_get_status(&mut conn, self.portal).await
            }
            // "/", the OS captive-portal probes (/generate_204, /fwlink,
            // /hotspot-detect.html) and every unknown path all render the
            // control page
            _ => handle_root(&mut conn, self.portal).await,
        }
    }
}

async fn handle_root(conn: &mut HttpConnection<'_>, portal: bool) -> HttpResult {
    let led_on = with_usecases(|usecases| usecases.led_is_on());
    let html = pages::render_home_page(led_on, portal);
    conn.write_html(200, html.as_str()).await
}

async fn handle_set_led(conn: &mut HttpConnection<'_>, on: bool) -> HttpResult {
    with_usecases(|usecases| usecases.set_led(on));
    conn.write_headers(&ResponseHeaders::see_other("/")).await
}

async fn handle_reset(conn: &mut HttpConnection<'_>) -> HttpResult {
    conn.write_html(200, pages::RESET_CONFIRMATION_HTML).await?;

    // Let the confirmation reach the client before tearing the network down
    Timer::after(Duration::from_millis(config::RESPONSE_FLUSH_MS)).await;
    erase_credentials_and_restart(Duration::from_millis(
        config::RESPONSE_FLUSH_MS,
    ))
    .await
}

async fn handle_save_credentials(conn: &mut HttpConnection<'_>) -> HttpResult {
    let Ok(dto) = conn.read_json::<CredentialsDto>().await else {
        return conn.write_headers(&ResponseHeaders::bad_request()).await;
    };
    if dto.ssid.is_empty() {
        return conn.write_headers(&ResponseHeaders::bad_request()).await;
    }

    let credentials = WifiCredentials {
        ssid: dto.ssid,
        password: dto.password,
    };
    if with_usecases(|usecases| usecases.save_credentials(&credentials)).is_err()
    {
        return conn.write_headers(&ResponseHeaders::internal_error()).await;
    }

    conn.write_headers(&ResponseHeaders::success_no_content())
        .await?;
    CREDENTIALS_SAVED.signal(());
    println!(
        "portal_http: credentials for '{}' stored, restarting",
        credentials.ssid.as_str()
    );

    // The device rejoins as a station on the next boot
    Timer::after(Duration::from_millis(config::RESPONSE_FLUSH_MS)).await;
    esp_hal::system::software_reset()
}

async fn handle_get_status(
    conn: &mut HttpConnection<'_>,
    portal: bool,
) -> HttpResult {
    let mut version = String::<32>::new();
    version.push_str(config::BUILD_VERSION).unwrap();

    let status = DeviceStatus {
        led: with_usecases(|usecases| usecases.led_is_on()),
        portal,
        version,
    };
    conn.write_json(&status).await
}
