//! Generic HTTP Server Adapter
//!
//! Allocates the socket buffers, wires a handler into the `HttpServer` and
//! runs the `listen_and_serve` loop. Not an Embassy task itself; meant to
//! be called from one.

use embassy_net::Stack;
#[cfg(feature = "log")]
use esp_println::println;

use crate::net::http::{HttpHandler, HttpServer};

const HTTP_PORT: u16 = 80;
const RX_BUFFER_SIZE: usize = 2048;
const TX_BUFFER_SIZE: usize = 2048;

/// Run the HTTP server with the given handler.
///
/// This function allocates 4KB of buffers on the stack (2KB RX + 2KB TX).
/// Ensure the calling task has sufficient stack size!
pub(crate) async fn run_http_server<H: HttpHandler>(
    stack: Stack<'static>,
    handler: &H,
) {
    let server = HttpServer::new(handler);
    let mut rx_buffer = [0u8; RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TX_BUFFER_SIZE];

    if let Err(_e) = server
        .listen_and_serve(stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await
    {
        #[cfg(feature = "log")]
        println!("http_server: connection error: {:?}", _e);
    }
}
