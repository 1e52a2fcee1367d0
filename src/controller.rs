use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::file::callbacks::{self, FileReader};
use humansize::format_size;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

use crate::dom::{self, FileTarget};
use crate::error::PreviewError;
use crate::log::{self, Level};
use crate::validate;

/// What a successful read delivers: a `data:` URL for the selected image.
/// `filter` is reserved for a future post-processing hook and is never set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewResult {
    pub src: Option<String>,
    pub filter: Option<String>,
}

/// Options accepted by [`UploadPreview::configure`] and
/// [`UploadPreview::attach`]. `attach` requires `file_element`; the callback
/// slots are independently optional.
#[derive(Default)]
pub struct PreviewOptions {
    pub file_element: Option<FileTarget>,
    pub on_success: Option<Rc<dyn Fn(PreviewResult)>>,
    pub on_error: Option<Rc<dyn Fn(PreviewError)>>,
}

impl PreviewOptions {
    pub fn new(target: impl Into<FileTarget>) -> Self {
        Self {
            file_element: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn on_success(mut self, callback: impl Fn(PreviewResult) + 'static) -> Self {
        self.on_success = Some(Rc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(PreviewError) + 'static) -> Self {
        self.on_error = Some(Rc::new(callback));
        self
    }
}

struct Inner {
    debug: bool,
    element: Option<HtmlInputElement>,
    on_success: Option<Rc<dyn Fn(PreviewResult)>>,
    on_error: Option<Rc<dyn Fn(PreviewError)>>,
    listener: Option<EventListener>,
    readers: HashMap<u64, FileReader>,
    next_read_id: u64,
}

/// The preview controller. Create one per binding; instances are independent
/// and clones of the same controller share state.
///
/// Dropping the last handle removes the `change` listener and aborts any
/// in-flight reads, so keep the controller alive for as long as previews
/// should keep arriving.
#[derive(Clone)]
pub struct UploadPreview {
    inner: Rc<RefCell<Inner>>,
}

impl Default for UploadPreview {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadPreview {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                debug: true,
                element: None,
                on_success: None,
                on_error: None,
                listener: None,
                readers: HashMap::new(),
                next_read_id: 0,
            })),
        }
    }

    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    pub fn debug(&self) -> bool {
        self.inner.borrow().debug
    }

    /// Toggles the diagnostic sink. On by default.
    pub fn set_debug(&self, debug: bool) -> &Self {
        self.inner.borrow_mut().debug = debug;
        self
    }

    /// Whether a `change` listener is currently installed.
    pub fn is_attached(&self) -> bool {
        self.inner.borrow().listener.is_some()
    }

    /// The currently bound file input, if the last `configure`/`attach`
    /// resolved one.
    pub fn target(&self) -> Option<HtmlInputElement> {
        self.inner.borrow().element.clone()
    }

    /// Stores the target element and callbacks, overwriting whatever was
    /// configured before. A target that does not resolve leaves the element
    /// slot empty. Returns the controller for chaining.
    pub fn configure(&self, options: PreviewOptions) -> &Self {
        let mut state = self.inner.borrow_mut();
        state.element = options.file_element.as_ref().and_then(dom::to_dom);
        state.on_success = options.on_success;
        state.on_error = options.on_error;
        self
    }

    /// Primary entry point: configures the controller and installs a `change`
    /// listener on the resolved file input. Attaching again replaces the
    /// previous listener, so only the most recent callback set ever fires.
    ///
    /// Never panics: a missing or unresolvable target is reported on the
    /// console and the controller is returned unchanged.
    pub fn attach(&self, options: PreviewOptions) -> &Self {
        let Some(target) = options.file_element else {
            return self.lg(&PreviewError::MissingFileElement.to_string(), Level::Error);
        };
        let Some(input) = dom::to_dom(&target) else {
            return self.lg(&PreviewError::InvalidFileElement.to_string(), Level::Error);
        };

        // The listener closure holds a Weak reference: the listener itself
        // lives inside Inner, and a strong reference would keep the pair
        // alive forever.
        let listener = {
            let inner = Rc::downgrade(&self.inner);
            EventListener::new(&input, "change", move |event| {
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                // Read the event target, not the configured element: a later
                // configure() call must not redirect events away from the
                // element this listener is attached to.
                let Some(input) = event
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                else {
                    if inner.borrow().debug {
                        log::emit("change event had no file input target", Level::Error);
                    }
                    return;
                };
                handle_change(&inner, &input);
            })
        };

        let mut state = self.inner.borrow_mut();
        state.element = Some(input);
        state.on_success = options.on_success;
        state.on_error = options.on_error;
        // dropping the previous EventListener detaches it from the element
        state.listener = Some(listener);
        self
    }

    /// Diagnostic sink: emits `data` on the console at the given level when
    /// debug is on. Returns the controller for chaining.
    pub fn lg(&self, data: &str, level: Level) -> &Self {
        if self.inner.borrow().debug {
            log::emit(data, level);
        }
        self
    }
}

fn handle_change(inner: &Rc<RefCell<Inner>>, input: &HtmlInputElement) {
    let value = input.value();
    let file = input.files().and_then(|list| list.get(0));
    let debug = inner.borrow().debug;

    if !validate::is_supported_image(&value) {
        deliver_error(inner, PreviewError::UnsupportedFormat);
        return;
    }
    if !dom::file_reader_supported() {
        deliver_error(inner, PreviewError::ReaderUnavailable);
        return;
    }
    let Some(file) = file else {
        if debug {
            log::emit("change event carried no file", Level::Warn);
        }
        return;
    };

    let file = gloo::file::File::from(file);
    if debug {
        log::emit(
            &format!(
                "reading {} ({})",
                file.name(),
                format_size(file.size(), humansize::BINARY)
            ),
            Level::Log,
        );
    }

    // Reads are keyed by a fresh id, never by file name: a gloo read task
    // aborts when dropped, and two quick selections of the same file must
    // both run to completion.
    let read_id = {
        let mut state = inner.borrow_mut();
        state.next_read_id += 1;
        state.next_read_id
    };
    let reader = {
        // Weak for the same reason as the change listener: the reader is
        // stored in Inner, and dropping the controller is supposed to abort
        // whatever is still in flight.
        let weak = Rc::downgrade(inner);
        callbacks::read_as_data_url(&file, move |result| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.borrow_mut().readers.remove(&read_id);
            match result {
                Ok(data_url) => deliver_success(&inner, data_url),
                Err(_) => deliver_error(&inner, PreviewError::ReadFailed),
            }
        })
    };
    inner.borrow_mut().readers.insert(read_id, reader);
}

// Delivery helpers clone the callback out of the RefCell before invoking it,
// so a callback is free to reconfigure the controller re-entrantly.

fn deliver_success(inner: &Rc<RefCell<Inner>>, data_url: String) {
    let (callback, debug) = {
        let state = inner.borrow();
        (state.on_success.clone(), state.debug)
    };
    let result = PreviewResult {
        src: Some(data_url),
        filter: None,
    };
    match callback {
        Some(callback) => callback(result),
        None => {
            if debug {
                log::emit("no success callback provided", Level::Error);
            }
        }
    }
}

fn deliver_error(inner: &Rc<RefCell<Inner>>, error: PreviewError) {
    let (callback, debug) = {
        let state = inner.borrow();
        (state.on_error.clone(), state.debug)
    };
    match callback {
        Some(callback) => callback(error),
        None => {
            if debug {
                log::emit(&error.to_string(), Level::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_results() -> (Rc<RefCell<Vec<PreviewResult>>>, PreviewOptions) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let options = PreviewOptions {
            file_element: None,
            on_success: Some(Rc::new(move |result| sink.borrow_mut().push(result))),
            on_error: None,
        };
        (seen, options)
    }

    #[test]
    fn options_builder_fills_the_slots() {
        let options = PreviewOptions::new("#picker")
            .on_success(|_| {})
            .on_error(|_| {});
        assert!(matches!(
            options.file_element,
            Some(FileTarget::Selector(ref s)) if s == "#picker"
        ));
        assert!(options.on_success.is_some());
        assert!(options.on_error.is_some());
    }

    #[test]
    fn default_options_are_empty() {
        let options = PreviewOptions::default();
        assert!(options.file_element.is_none());
        assert!(options.on_success.is_none());
        assert!(options.on_error.is_none());
    }

    #[test]
    fn successful_read_delivers_once_with_filter_unset() {
        let preview = UploadPreview::new();
        preview.set_debug(false);
        let (seen, options) = counting_results();
        preview.configure(options);

        deliver_success(&preview.inner, "data:image/png;base64,AAAA".to_owned());

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            PreviewResult {
                src: Some("data:image/png;base64,AAAA".to_owned()),
                filter: None,
            }
        );
    }

    #[test]
    fn failed_read_reports_error_and_never_success() {
        let preview = UploadPreview::new();
        preview.set_debug(false);
        let successes = Rc::new(RefCell::new(0u32));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let success_sink = Rc::clone(&successes);
        let error_sink = Rc::clone(&errors);
        preview.configure(PreviewOptions {
            file_element: None,
            on_success: Some(Rc::new(move |_| *success_sink.borrow_mut() += 1)),
            on_error: Some(Rc::new(move |error| error_sink.borrow_mut().push(error))),
        });

        deliver_error(&preview.inner, PreviewError::ReadFailed);

        assert_eq!(*successes.borrow(), 0);
        assert_eq!(errors.borrow().as_slice(), &[PreviewError::ReadFailed]);
    }

    #[test]
    fn delivery_without_callbacks_is_silent_when_debug_is_off() {
        let preview = UploadPreview::new();
        preview.set_debug(false);
        // No callbacks registered and debug off: both paths must be no-ops.
        deliver_success(&preview.inner, "data:image/gif;base64,AAAA".to_owned());
        deliver_error(&preview.inner, PreviewError::UnsupportedFormat);
    }

    #[test]
    fn callbacks_may_reconfigure_the_controller() {
        let preview = UploadPreview::new();
        preview.set_debug(false);
        let reconfigured = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&reconfigured);
        let handle = preview.clone();
        preview.configure(PreviewOptions {
            file_element: None,
            on_success: Some(Rc::new(move |_| {
                handle.configure(PreviewOptions::default());
                *flag.borrow_mut() = true;
            })),
            on_error: None,
        });

        deliver_success(&preview.inner, "data:image/bmp;base64,AAAA".to_owned());
        assert!(*reconfigured.borrow());
        assert!(preview.inner.borrow().on_success.is_none());
    }

    #[test]
    fn configure_overwrites_previous_callbacks() {
        let preview = UploadPreview::new();
        preview.set_debug(false);
        let (first, options) = counting_results();
        preview.configure(options);
        let (second, options) = counting_results();
        preview.configure(options);

        deliver_success(&preview.inner, "data:image/jpeg;base64,AAAA".to_owned());
        assert!(first.borrow().is_empty());
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn debug_flag_defaults_on_and_toggles() {
        let preview = UploadPreview::new();
        assert!(preview.debug());
        preview.set_debug(false);
        assert!(!preview.debug());
        assert_eq!(preview.version(), "1.0.0");
        assert!(!preview.is_attached());
    }
}
