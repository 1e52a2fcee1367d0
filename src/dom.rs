use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlInputElement};

/// Where to find the file input: a CSS selector or the element itself.
#[derive(Debug, Clone)]
pub enum FileTarget {
    Selector(String),
    Element(HtmlInputElement),
}

impl From<&str> for FileTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for FileTarget {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<HtmlInputElement> for FileTarget {
    fn from(element: HtmlInputElement) -> Self {
        Self::Element(element)
    }
}

/// True iff the value is a genuine DOM element node.
pub fn is_dom(value: &JsValue) -> bool {
    value.dyn_ref::<Element>().is_some()
}

/// Resolves a target to an input element. Selectors go through
/// `document.querySelector` and must match an `<input>`; anything else is
/// `None`.
pub fn to_dom(target: &FileTarget) -> Option<HtmlInputElement> {
    match target {
        FileTarget::Selector(selector) => web_sys::window()?
            .document()?
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok()),
        FileTarget::Element(element) => Some(element.clone()),
    }
}

/// Whether the runtime exposes `FileReader` at all.
pub(crate) fn file_reader_supported() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("FileReader")).unwrap_or(false)
}
