//! [`Fetch`] over the browser `fetch()`.

use bookclub_client::transport::{Body, Fetch, HttpRequest, HttpResponse, Part};
use futures::{FutureExt as _, future::LocalBoxFuture};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

/// Browser networking.
pub struct BrowserFetch;

impl Fetch for BrowserFetch {
    fn fetch(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, String>> {
        async move { send(request).await.map_err(|err| err.to_string()) }.boxed_local()
    }
}

/// Failure of the browser `fetch()`.
///
/// `Display` reaches the user through the transport alert.
#[derive(Debug, Clone, thiserror::Error, displaydoc::Display)]
enum FetchError {
    /// Вікно браузера недоступне
    NoWindow,
    /// Не вдалося сформувати запит: {0}
    Request(String),
    /// {0}
    Network(String),
}

impl From<JsValue> for FetchError {
    fn from(err: JsValue) -> Self {
        Self::Request(describe(&err))
    }
}

async fn send(request: HttpRequest) -> Result<HttpResponse, FetchError> {
    let window = web_sys::window().ok_or(FetchError::NoWindow)?;

    let headers = Headers::new()?;
    for (name, value) in &request.headers {
        headers.set(name, value)?;
    }

    let init = RequestInit::new();
    init.set_method(request.method.as_str());
    init.set_headers(&headers);
    match &request.body {
        Body::Empty => {}
        Body::Json(json) => init.set_body(&JsValue::from_str(json)),
        Body::Multipart(parts) => init.set_body(&form_data(parts)?.into()),
    }

    let js_request = Request::new_with_str_and_init(request.url.as_str(), &init)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&js_request))
        .await
        .map_err(|err| FetchError::Network(describe(&err)))?
        .dyn_into()?;
    let body = JsFuture::from(response.text()?)
        .await
        .map_err(|err| FetchError::Network(describe(&err)))?
        .as_string()
        .unwrap_or_default();

    Ok(HttpResponse {
        status: response.status(),
        body,
    })
}

/// Multipart body. The browser sets the boundary header itself.
fn form_data(parts: &[Part]) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    for part in parts {
        match part {
            Part::Text { name, value } => form.append_with_str(name, value)?,
            Part::File { name, attachment } => {
                let bytes = Array::of1(&Uint8Array::from(attachment.bytes()));
                let options = BlobPropertyBag::new();
                options.set_type(attachment.mime_type());
                let blob = Blob::new_with_u8_array_sequence_and_options(&bytes, &options)?;
                form.append_with_blob_and_filename(name, &blob, attachment.file_name())?;
            }
        }
    }
    Ok(form)
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}
