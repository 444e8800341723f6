use lora_capture::DeliverySink;

#[cfg(not(target_arch = "wasm32"))]
use lora_capture::DirectorySink;

#[cfg(target_arch = "wasm32")]
use lora_capture::DatasetError;

#[cfg(target_arch = "wasm32")]
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Where exported datasets go: the export directory natively, browser
/// downloads on the web.
pub fn export_sink(export_dir: &str) -> Box<dyn DeliverySink + Send> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(DirectorySink::new(export_dir))
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = export_dir;
        Box::new(BrowserDownloadSink::default())
    }
}

/// Triggers one browser download per delivered file.
///
/// Pauses cannot block the page, so they push the next download further
/// out on the page's timer queue instead.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct BrowserDownloadSink {
    delay_ms: f64,
}

#[cfg(target_arch = "wasm32")]
const OBJECT_URL_LIFETIME_MS: f64 = 1000.0;

#[cfg(target_arch = "wasm32")]
impl DeliverySink for BrowserDownloadSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DatasetError> {
        let failed = |reason: String| DatasetError::Delivery {
            file: file_name.to_string(),
            reason,
        };

        let window = web_sys::window().ok_or_else(|| failed("no browser window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| failed("no document".to_string()))?;

        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
        let blob = web_sys::Blob::new_with_u8_array_sequence(&parts)
            .map_err(|e| failed(format!("{:?}", e)))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|e| failed(format!("{:?}", e)))?;

        let anchor: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(|e| failed(format!("{:?}", e)))?
            .dyn_into()
            .map_err(|_| failed("anchor element unavailable".to_string()))?;
        anchor.set_href(&url);
        anchor.set_download(file_name);

        let click = Closure::once_into_js(move || anchor.click());
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                click.unchecked_ref(),
                self.delay_ms as i32,
            )
            .map_err(|e| failed(format!("{:?}", e)))?;

        let revoke = Closure::once_into_js(move || {
            let _ = web_sys::Url::revoke_object_url(&url);
        });
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                revoke.unchecked_ref(),
                (self.delay_ms + OBJECT_URL_LIFETIME_MS) as i32,
            )
            .map_err(|e| failed(format!("{:?}", e)))?;

        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.delay_ms += duration.as_millis() as f64;
    }
}
