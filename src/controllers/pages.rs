//! Control page renderer.
//!
//! Pure function of the LED state (and whether the portal is active) to an
//! HTML document: identical inputs produce byte-identical output. The
//! action still available is the colored one; the already-applied action
//! renders neutral.

use core::fmt::Write;

use heapless::String;

use crate::config;

pub(crate) const HOME_PAGE_SIZE: usize = 2048;

const STYLE: &str = "button{padding:10px 20px;font-size:16px;margin:10px;\
border:none;}\
.green{background-color:green;color:white;}\
.red{background-color:red;color:white;}\
.blue{background-color:#06c;color:white;}\
.plain{background-color:white;color:black;border:1px solid #ccc;}\
input{padding:8px;font-size:16px;margin:4px;}";

const SETUP_FORM: &str = "<h3>Wi-Fi Setup</h3>\
<form onsubmit=\"save(event)\">\
<p><input id=\"ssid\" placeholder=\"Network name\" maxlength=\"32\"></p>\
<p><input id=\"password\" type=\"password\" placeholder=\"Passphrase\" \
maxlength=\"64\"></p>\
<p><button class=\"green\" type=\"submit\">Save &amp; Reboot</button></p>\
</form>\
<script>async function save(e){e.preventDefault();\
await fetch('/api/credentials',{method:'POST',\
headers:{'Content-Type':'application/json'},\
body:JSON.stringify({ssid:document.getElementById('ssid').value,\
password:document.getElementById('password').value})});\
document.body.innerHTML='<h3>Saved. Rebooting...</h3>';}</script>";

/// Render the control page.
pub(crate) fn render_home_page(led_on: bool, portal: bool) -> String<HOME_PAGE_SIZE> {
    // The available action is highlighted, the applied one is neutral
    let (on_class, off_class) = if led_on {
        ("plain", "red")
    } else {
        ("green", "plain")
    };

    let mut html = String::new();
    html.push_str(
        "<html><head><meta name=\"viewport\" \
content=\"width=device-width, initial-scale=1\"><style>",
    )
    .unwrap();
    html.push_str(STYLE).unwrap();
    write!(html, "</style></head><body><h1>{}</h1>", config::DEVICE.name)
        .unwrap();
    html.push_str(
        "<p><a href=\"/reset\"><button class=\"blue\">\
Reset WiFi Settings</button></a></p>",
    )
    .unwrap();
    write!(
        html,
        "<p><a href=\"/led/on\"><button class=\"{on_class}\">\
Turn LED On</button></a></p>\
<p><a href=\"/led/off\"><button class=\"{off_class}\">\
Turn LED Off</button></a></p>"
    )
    .unwrap();
    if portal {
        html.push_str(SETUP_FORM).unwrap();
    }
    html.push_str("</body></html>").unwrap();

    html
}

/// Confirmation shown by `/reset` right before the device reboots.
pub(crate) const RESET_CONFIRMATION_HTML: &str =
    "<h3>WiFi credentials erased.<br>Rebooting...</h3>";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render_home_page(true, false), render_home_page(true, false));
        assert_eq!(
            render_home_page(false, true),
            render_home_page(false, true)
        );
    }

    #[test]
    fn available_action_is_highlighted() {
        let off = render_home_page(false, false);
        assert!(off.contains("class=\"green\">Turn LED On"));
        assert!(off.contains("class=\"plain\">Turn LED Off"));

        let on = render_home_page(true, false);
        assert!(on.contains("class=\"plain\">Turn LED On"));
        assert!(on.contains("class=\"red\">Turn LED Off"));
    }

    #[test]
    fn setup_form_only_appears_in_portal_mode() {
        assert!(render_home_page(false, true).contains("Wi-Fi Setup"));
        assert!(!render_home_page(false, false).contains("Wi-Fi Setup"));
    }

    #[test]
    fn reset_link_is_always_present() {
        for (led_on, portal) in [(false, false), (true, false), (false, true)] {
            assert!(render_home_page(led_on, portal).contains("href=\"/reset\""));
        }
    }
}
