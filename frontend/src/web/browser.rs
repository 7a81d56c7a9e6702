//! 浏览器接缝的 DOM 实现

use kozlony::Browser;
use wasm_bindgen::JsValue;
use web_sys::{Document, Window};

pub struct DomBrowser {
    window: Window,
    document: Document,
}

impl DomBrowser {
    /// 没有 window 或 document 时返回 `None`
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Browser for DomBrowser {
    fn current_path(&self) -> String {
        self.window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string())
    }

    fn push_history(&self, path: &str) {
        let result = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(e) = result {
            tracing::warn!(path, error = ?e, "pushState failed");
        }
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn set_body_attribute(&self, name: &str, value: &str) {
        let Some(body) = self.document.body() else {
            return;
        };
        if let Err(e) = body.set_attribute(name, value) {
            tracing::warn!(name, error = ?e, "failed to set body attribute");
        }
    }

    fn set_region_html(&self, id: &str, html: &str) -> bool {
        match self.document.get_element_by_id(id) {
            Some(region) => {
                region.set_inner_html(html);
                true
            }
            None => false,
        }
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}
