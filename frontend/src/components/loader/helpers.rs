//! Browser-side helpers for the loader component: notifications, page
//! configuration and file reading.

use gloo_file::futures::read_as_text;
use log::warn;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use common::config::ApiConfig;

/// Element id of the optional inline JSON configuration block.
pub const CONFIG_ELEMENT_ID: &str = "dbloader-config";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    fn background(self) -> &'static str {
        match self {
            ToastKind::Info => "rgba(33, 82, 160, 0.9)",
            ToastKind::Success => "rgba(46, 125, 50, 0.9)",
            ToastKind::Error => "rgba(198, 40, 40, 0.9)",
        }
    }
}

/// Shows a notification at the bottom of the page for three seconds.
///
/// The message is set as text, never as markup: server error details end up
/// here verbatim.
pub fn show_toast(message: &str, kind: ToastKind) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) else {
        return;
    };
    toast.set_text_content(Some(message));
    toast.set_class_name("notification");
    let html_toast: HtmlElement = toast.unchecked_into();
    let style = html_toast.style();
    style.set_property("position", "fixed").ok();
    style.set_property("bottom", "20px").ok();
    style.set_property("left", "50%").ok();
    style.set_property("transform", "translateX(-50%)").ok();
    style.set_property("background", kind.background()).ok();
    style.set_property("color", "#fff").ok();
    style.set_property("padding", "10px 20px").ok();
    style.set_property("border-radius", "4px").ok();
    style.set_property("z-index", "10000").ok();
    style.set_property("font-family", "Arial, sans-serif").ok();

    if body.append_child(&html_toast).is_ok() {
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(3000).await;
            if let Some(parent) = html_toast.parent_node() {
                parent.remove_child(&html_toast).ok();
            }
        });
    }
}

/// Reads the page's inline configuration, or the defaults when the block is
/// missing or invalid.
pub fn read_page_config() -> ApiConfig {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|e| e.text_content());
    match text {
        Some(text) if !text.trim().is_empty() => ApiConfig::from_json_str(&text).unwrap_or_else(|err| {
            warn!("ignoring page configuration: {}", err);
            ApiConfig::default()
        }),
        _ => ApiConfig::default(),
    }
}

/// Reads a selected file as UTF-8 text.
pub async fn read_file_text(file: web_sys::File) -> Result<(String, u64, String), String> {
    let file = gloo_file::File::from(file);
    let name = file.name();
    let size = file.size();
    let text = read_as_text(&file).await.map_err(|err| err.to_string())?;
    Ok((name, size, text))
}
