//! Platform file and asset I/O.
//!
//! Native builds use file dialogs and decode asset dimensions on worker
//! threads. Browser builds download through a Blob link, read uploads with a
//! `FileReader` and decode assets with an `<img>` element. Either way results
//! are parked until the UI thread polls them on its next frame.

use stencil_core::persistence::LoadError;
use stencil_core::session::{PendingImage, PendingLoad};
use thiserror::Error;

/// Errors raised by platform I/O.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    Missing(String),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Unavailable on this platform: {0}")]
    Unavailable(String),
}

/// A finished asset decode.
#[derive(Debug)]
pub struct DecodedImage {
    pub pending: PendingImage,
    /// Natural width and height in pixels.
    pub dimensions: Result<(u32, u32), AssetError>,
}

/// A picked document file.
#[derive(Debug)]
pub struct UploadedFile {
    pub pending: PendingLoad,
    pub file_name: String,
    pub contents: Result<String, LoadError>,
}

/// Shared state that browser upload callbacks report into.
///
/// Every way a picker can end (file read, read error, cancel) clears
/// `waiting`, so the UI stops polling.
#[cfg(any(target_arch = "wasm32", test))]
#[derive(Clone, Default)]
struct UploadSink {
    slot: std::rc::Rc<std::cell::RefCell<Option<UploadedFile>>>,
    waiting: std::rc::Rc<std::cell::RefCell<bool>>,
}

#[cfg(any(target_arch = "wasm32", test))]
impl UploadSink {
    fn start(&self) {
        *self.waiting.borrow_mut() = true;
    }

    fn park(&self, upload: UploadedFile) {
        *self.waiting.borrow_mut() = false;
        *self.slot.borrow_mut() = Some(upload);
    }

    fn fail(&self, pending: PendingLoad, file_name: String, message: String) {
        log::error!("{}", message);
        self.park(UploadedFile {
            pending,
            file_name,
            contents: Err(LoadError::Io(message)),
        });
    }

    fn cancel(&self) {
        *self.waiting.borrow_mut() = false;
    }

    fn take(&self) -> Option<UploadedFile> {
        self.slot.borrow_mut().take()
    }

    fn is_waiting(&self) -> bool {
        *self.waiting.borrow()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native_assets::{ImageDecoder, resolve_asset};

#[cfg(not(target_arch = "wasm32"))]
mod native_assets {
    use super::{AssetError, DecodedImage};
    use std::path::{Path, PathBuf};
    use std::sync::mpsc::{self, Receiver, Sender};
    use stencil_core::session::PendingImage;

    /// Map an absolute asset path (`/image-icon.png`) into the asset root.
    pub fn resolve_asset(root: &Path, source: &str) -> PathBuf {
        root.join(source.trim_start_matches('/'))
    }

    /// Decodes asset dimensions off the UI thread.
    pub struct ImageDecoder {
        asset_root: PathBuf,
        tx: Sender<DecodedImage>,
        rx: Receiver<DecodedImage>,
        in_flight: usize,
    }

    impl ImageDecoder {
        pub fn new(asset_root: impl Into<PathBuf>) -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                asset_root: asset_root.into(),
                tx,
                rx,
                in_flight: 0,
            }
        }

        /// Start decoding the asset behind a pending drop.
        pub fn request(&mut self, pending: PendingImage) {
            let path = resolve_asset(&self.asset_root, pending.source);
            let tx = self.tx.clone();
            self.in_flight += 1;
            std::thread::spawn(move || {
                let dimensions = read_dimensions(&path);
                // The receiver is gone only if the app already shut down.
                let _ = tx.send(DecodedImage { pending, dimensions });
            });
        }

        /// Collect every decode that finished since the last poll.
        pub fn poll(&mut self) -> Vec<DecodedImage> {
            let done: Vec<_> = self.rx.try_iter().collect();
            self.in_flight -= done.len();
            done
        }

        /// Decodes not yet collected.
        pub fn in_flight(&self) -> usize {
            self.in_flight
        }
    }

    fn read_dimensions(path: &Path) -> Result<(u32, u32), AssetError> {
        image::image_dimensions(path).map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                AssetError::Missing(path.display().to_string())
            }
            other => AssetError::Decode {
                path: path.display().to_string(),
                message: other.to_string(),
            },
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use kurbo::Point;
        use std::time::{Duration, Instant};
        use stencil_core::palette::PrimitiveKind;
        use stencil_core::session::{DropOutcome, EditorSession};
        use tempfile::tempdir;

        fn pending_drop(session: &mut EditorSession, kind: PrimitiveKind) -> PendingImage {
            session.begin_drag(kind);
            match session.drop_at(Point::new(100.0, 100.0)).unwrap() {
                DropOutcome::Pending(pending) => pending,
                DropOutcome::Placed(_) => panic!("{kind} should be deferred"),
            }
        }

        fn wait_for(decoder: &mut ImageDecoder) -> DecodedImage {
            let deadline = Instant::now() + Duration::from_secs(5);
            loop {
                if let Some(done) = decoder.poll().pop() {
                    return done;
                }
                assert!(Instant::now() < deadline, "decode timed out");
                std::thread::sleep(Duration::from_millis(5));
            }
        }

        #[test]
        fn test_resolve_asset() {
            let root = Path::new("public");
            assert_eq!(resolve_asset(root, "/icon-icon.png"), Path::new("public/icon-icon.png"));
        }

        #[test]
        fn test_decode_dimensions() {
            let dir = tempdir().unwrap();
            image::RgbaImage::new(64, 32)
                .save(dir.path().join("image-icon.png"))
                .unwrap();

            let mut session = EditorSession::default();
            let mut decoder = ImageDecoder::new(dir.path());
            decoder.request(pending_drop(&mut session, PrimitiveKind::Image));
            assert_eq!(decoder.in_flight(), 1);

            let done = wait_for(&mut decoder);
            assert_eq!(decoder.in_flight(), 0);
            assert_eq!(done.dimensions, Ok((64, 32)));

            let id = session.finish_image(done.pending, 64, 32).unwrap();
            let image = session.canvas().document.get_shape(id).unwrap();
            assert_eq!(image.bounds().width(), 32.0);
        }

        #[test]
        fn test_missing_asset() {
            let dir = tempdir().unwrap();
            let mut session = EditorSession::default();
            let mut decoder = ImageDecoder::new(dir.path());
            decoder.request(pending_drop(&mut session, PrimitiveKind::Icon));

            let done = wait_for(&mut decoder);
            assert!(matches!(done.dimensions, Err(AssetError::Missing(_))));
        }
    }
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use file_ops::{Uploads, save_document};

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
mod file_ops {
    use super::{AssetError, UploadedFile};
    use stencil_core::persistence::{DOWNLOAD_FILE_NAME, FILE_EXTENSION, LoadError};
    use stencil_core::session::PendingLoad;

    /// Save a document through a native dialog. Returns false if cancelled.
    pub fn save_document(json: &str) -> Result<bool, AssetError> {
        let dialog = rfd::FileDialog::new()
            .set_title("Save Canvas")
            .set_file_name(DOWNLOAD_FILE_NAME)
            .add_filter("Canvas Document", &[FILE_EXTENSION]);

        let Some(path) = dialog.save_file() else {
            return Ok(false);
        };
        std::fs::write(&path, json)
            .map_err(|e| AssetError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Saved canvas to: {:?}", path);
        Ok(true)
    }

    /// Document uploads. The native dialog blocks, so results are ready immediately.
    #[derive(Default)]
    pub struct Uploads {
        ready: Option<UploadedFile>,
    }

    impl Uploads {
        /// Open a file picker for a scene document.
        pub fn request(&mut self, pending: PendingLoad) {
            let dialog = rfd::FileDialog::new()
                .set_title("Load Canvas")
                .add_filter("Canvas Document", &[FILE_EXTENSION]);

            let Some(path) = dialog.pick_file() else {
                return;
            };
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| LoadError::Io(format!("Failed to read {}: {}", path.display(), e)));
            self.ready = Some(UploadedFile {
                pending,
                file_name,
                contents,
            });
        }

        /// Take the picked document, if any.
        pub fn poll(&mut self) -> Option<UploadedFile> {
            self.ready.take()
        }

        pub fn is_waiting(&self) -> bool {
            false
        }
    }
}

#[cfg(all(not(feature = "native"), not(target_arch = "wasm32")))]
pub use headless_file_ops::{Uploads, save_document};

/// Builds without the `native` feature have no file dialogs.
#[cfg(all(not(feature = "native"), not(target_arch = "wasm32")))]
mod headless_file_ops {
    use super::{AssetError, UploadedFile};
    use stencil_core::session::PendingLoad;

    pub fn save_document(_json: &str) -> Result<bool, AssetError> {
        Err(AssetError::Unavailable("file dialogs".to_string()))
    }

    #[derive(Default)]
    pub struct Uploads;

    impl Uploads {
        pub fn request(&mut self, _pending: PendingLoad) {
            log::warn!("File dialogs are disabled in this build");
        }

        pub fn poll(&mut self) -> Option<UploadedFile> {
            None
        }

        pub fn is_waiting(&self) -> bool {
            false
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web_ops::{ImageDecoder, Uploads, save_document};

#[cfg(target_arch = "wasm32")]
mod web_ops {
    use super::{AssetError, DecodedImage, UploadSink, UploadedFile};
    use std::cell::RefCell;
    use std::rc::Rc;
    use stencil_core::persistence::{DOWNLOAD_FILE_NAME, FILE_EXTENSION, LoadError, MIME_TYPE};
    use stencil_core::session::{PendingImage, PendingLoad};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    fn unavailable(what: &str) -> AssetError {
        AssetError::Unavailable(what.to_string())
    }

    fn document() -> Result<web_sys::Document, AssetError> {
        web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| unavailable("document"))
    }

    /// Trigger a browser download of the document.
    pub fn save_document(json: &str) -> Result<bool, AssetError> {
        let document = document()?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&JsValue::from_str(json));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(MIME_TYPE);
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &options)
            .map_err(|_| unavailable("Blob"))?;

        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|_| unavailable("object URL"))?;
        let a = document
            .create_element("a")
            .ok()
            .and_then(|el| el.dyn_into::<web_sys::HtmlAnchorElement>().ok())
            .ok_or_else(|| unavailable("anchor element"))?;

        a.set_href(&url);
        a.set_download(DOWNLOAD_FILE_NAME);
        a.click();

        web_sys::Url::revoke_object_url(&url).ok();
        log::info!("Downloaded {}", DOWNLOAD_FILE_NAME);
        Ok(true)
    }

    /// Document uploads read through a hidden file input.
    #[derive(Default)]
    pub struct Uploads {
        sink: UploadSink,
    }

    impl Uploads {
        /// Open the browser file picker. The result arrives on a later frame.
        pub fn request(&mut self, pending: PendingLoad) {
            if let Err(e) = self.open_picker(pending) {
                log::error!("Failed to open file picker: {}", e);
                self.sink.cancel();
            }
        }

        fn open_picker(&mut self, pending: PendingLoad) -> Result<(), AssetError> {
            use wasm_bindgen::closure::Closure;

            let document = document()?;
            let input = document
                .create_element("input")
                .ok()
                .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
                .ok_or_else(|| unavailable("file input"))?;

            input.set_type("file");
            input.set_accept(&format!(".{}", FILE_EXTENSION));
            input.style().set_property("display", "none").ok();

            let sink = self.sink.clone();
            let input_clone = input.clone();
            let onchange = Closure::once(Box::new(move |_event: web_sys::Event| {
                let file = input_clone.files().and_then(|files| files.get(0));
                input_clone.remove();
                let Some(file) = file else {
                    sink.cancel();
                    return;
                };
                let file_name = file.name();
                let Ok(reader) = web_sys::FileReader::new() else {
                    sink.fail(pending, file_name, "FileReader unavailable".to_string());
                    return;
                };

                let load_sink = sink.clone();
                let load_pending = pending.clone();
                let load_name = file_name.clone();
                let reader_clone = reader.clone();
                let onload = Closure::once(Box::new(move |_event: web_sys::Event| {
                    let contents = reader_clone
                        .result()
                        .ok()
                        .and_then(|value| value.as_string())
                        .ok_or_else(|| LoadError::Io(format!("Failed to read {}", load_name)));
                    load_sink.park(UploadedFile {
                        pending: load_pending,
                        file_name: load_name,
                        contents,
                    });
                }) as Box<dyn FnOnce(_)>);

                let error_sink = sink.clone();
                let error_pending = pending.clone();
                let error_name = file_name.clone();
                let onerror = Closure::once(Box::new(move |_event: web_sys::Event| {
                    let message = format!("Failed to read {}", error_name);
                    error_sink.fail(error_pending, error_name, message);
                }) as Box<dyn FnOnce(_)>);

                reader.set_onload(Some(onload.as_ref().unchecked_ref()));
                reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
                onload.forget();
                onerror.forget();
                if reader.read_as_text(&file).is_err() {
                    let message = format!("Failed to start reading {}", file_name);
                    sink.fail(pending, file_name, message);
                }
            }) as Box<dyn FnOnce(_)>);

            let cancel_sink = self.sink.clone();
            let input_cancel = input.clone();
            let oncancel = Closure::once(Box::new(move |_event: web_sys::Event| {
                input_cancel.remove();
                cancel_sink.cancel();
            }) as Box<dyn FnOnce(_)>);

            input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
            input
                .add_event_listener_with_callback("cancel", oncancel.as_ref().unchecked_ref())
                .ok();
            onchange.forget();
            oncancel.forget();

            let body = document.body().ok_or_else(|| unavailable("document body"))?;
            body.append_child(&input).map_err(|_| unavailable("file input"))?;
            self.sink.start();
            input.click();
            Ok(())
        }

        /// Take the uploaded document, if it has been read.
        pub fn poll(&mut self) -> Option<UploadedFile> {
            self.sink.take()
        }

        /// Whether a picked file is still being read.
        pub fn is_waiting(&self) -> bool {
            self.sink.is_waiting()
        }
    }

    /// Decodes asset dimensions with `<img>` elements.
    #[derive(Default)]
    pub struct ImageDecoder {
        done: Rc<RefCell<Vec<DecodedImage>>>,
        in_flight: Rc<RefCell<usize>>,
    }

    impl ImageDecoder {
        /// Assets resolve against the page origin, so the root is unused.
        pub fn new(_asset_root: impl Into<std::path::PathBuf>) -> Self {
            Self::default()
        }

        /// Start decoding the asset behind a pending drop.
        pub fn request(&mut self, pending: PendingImage) {
            use wasm_bindgen::closure::Closure;

            let img = match document().and_then(|doc| {
                doc.create_element("img")
                    .ok()
                    .and_then(|el| el.dyn_into::<web_sys::HtmlImageElement>().ok())
                    .ok_or_else(|| unavailable("image element"))
            }) {
                Ok(img) => img,
                Err(e) => {
                    self.done.borrow_mut().push(DecodedImage {
                        pending,
                        dimensions: Err(e),
                    });
                    return;
                }
            };

            let source = pending.source;
            // Either callback may fire; whichever does takes the ticket.
            let ticket = Rc::new(RefCell::new(Some(pending)));

            let done = Rc::clone(&self.done);
            let img_inner = img.clone();
            let ticket_load = Rc::clone(&ticket);
            let onload = Closure::once(Box::new(move |_: web_sys::Event| {
                if let Some(pending) = ticket_load.borrow_mut().take() {
                    let dimensions = Ok((img_inner.natural_width(), img_inner.natural_height()));
                    done.borrow_mut().push(DecodedImage { pending, dimensions });
                }
            }) as Box<dyn FnOnce(_)>);

            let done = Rc::clone(&self.done);
            let onerror = Closure::once(Box::new(move |_: web_sys::Event| {
                if let Some(pending) = ticket.borrow_mut().take() {
                    let dimensions = Err(AssetError::Missing(source.to_string()));
                    done.borrow_mut().push(DecodedImage { pending, dimensions });
                }
            }) as Box<dyn FnOnce(_)>);

            img.set_onload(Some(onload.as_ref().unchecked_ref()));
            img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onload.forget();
            onerror.forget();

            *self.in_flight.borrow_mut() += 1;
            img.set_src(source);
        }

        /// Collect every decode that finished since the last poll.
        pub fn poll(&mut self) -> Vec<DecodedImage> {
            let done = std::mem::take(&mut *self.done.borrow_mut());
            let mut in_flight = self.in_flight.borrow_mut();
            *in_flight = in_flight.saturating_sub(done.len());
            done
        }

        /// Decodes not yet collected.
        pub fn in_flight(&self) -> usize {
            *self.in_flight.borrow()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::session::EditorSession;

    #[test]
    fn test_upload_sink_cancel_clears_waiting() {
        let sink = UploadSink::default();
        sink.start();
        assert!(sink.is_waiting());

        sink.cancel();
        assert!(!sink.is_waiting());
        assert!(sink.take().is_none());
    }

    #[test]
    fn test_upload_sink_read_error_is_reported() {
        let session = EditorSession::default();
        let sink = UploadSink::default();
        sink.start();

        sink.fail(session.begin_load(), "canvas.json".to_string(), "Failed to read canvas.json".to_string());
        assert!(!sink.is_waiting());

        let upload = sink.take().unwrap();
        assert_eq!(upload.file_name, "canvas.json");
        assert!(matches!(upload.contents, Err(LoadError::Io(_))));
    }
}
