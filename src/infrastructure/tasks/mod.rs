mod http_server;
mod reset_button;

pub use http_server::http_server_task;
pub use reset_button::reset_button_task;
