//! Preview-on-select for file inputs.
//!
//! Bind an [`UploadPreview`] controller to an `<input type="file">` and get a
//! data URL for every image the user picks, ready to drop into an `<img>`
//! `src`. The file is read in the browser via `FileReader`; nothing is
//! uploaded anywhere.
//!
//! ```no_run
//! use upload_preview::{PreviewOptions, UploadPreview};
//!
//! let preview = UploadPreview::new();
//! preview.attach(
//!     PreviewOptions::new("#avatar-input")
//!         .on_success(|result| {
//!             if let Some(src) = result.src {
//!                 // hand the data URL to an <img> element
//!                 let _ = src;
//!             }
//!         })
//!         .on_error(|err| gloo::console::warn!(err.to_string())),
//! );
//! ```
//!
//! Every expected failure is reported through the `on_error` callback or the
//! console diagnostic sink; nothing panics and nothing is thrown back at the
//! caller.

mod controller;
mod dom;
mod error;
mod log;
mod validate;

pub use controller::{PreviewOptions, PreviewResult, UploadPreview};
pub use dom::{FileTarget, is_dom, to_dom};
pub use error::PreviewError;
pub use log::Level;
pub use validate::is_supported_image;

/// Library version, reported by [`UploadPreview::version`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
