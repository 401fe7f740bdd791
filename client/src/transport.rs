//! HTTP transport to the REST API.
//!
//! [`Transport`] attaches the identity header, maps failures to [`Error`] and raises the one
//! user-facing alert per failed call. Actual sending is done by a [`Fetch`] implementation
//! provided by the platform.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    config::Config,
    host::{Host, alert_supported},
};

/// Header carrying the signed session token.
pub const IDENTITY_HEADER: &str = "X-Telegram-Init-Data";

/// Maximal size of an image attachment.
pub const MAX_ATTACHMENT_SIZE: usize = 5 * 1024 * 1024;

/// Message shown when the backend refuses the session.
const SESSION_EXPIRED_MESSAGE: &str =
    "Схоже сесія завершилась, спробуйте закрити і відкрити додаток заново";

/// Transport result type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failed API call.
///
/// `Display` gives the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, displaydoc::Display)]
pub enum Error {
    /// {0}
    Network(String),
    /// Схоже сесія завершилась, спробуйте закрити і відкрити додаток заново
    SessionExpired {
        /// 401 or 403.
        status: u16,
    },
    /// {message}
    Api {
        /// Response status.
        status: u16,
        /// Message derived from the `detail` field.
        message: String,
    },
    /// Некоректна відповідь сервера: {0}
    Malformed(String),
    /// Не вдалося сформувати запит: {0}
    Encoding(String),
}

impl Error {
    /// HTTP status if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired { status } | Self::Api { status, .. } => Some(*status),
            Self::Network(_) | Self::Malformed(_) | Self::Encoding(_) => None,
        }
    }
}

/// Map a non-2xx response to [`Error`].
///
/// `detail` string is used verbatim, other `detail` values are shown as compact JSON, and
/// everything else falls back to `HTTP <status>`. Auth failures always get a fixed message.
#[must_use]
pub fn error_from_response(status: u16, body: &str) -> Error {
    if status == 401 || status == 403 {
        return Error::SessionExpired { status };
    }

    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|mut value| value.get_mut("detail").map(serde_json::Value::take));

    let message = match detail {
        Some(serde_json::Value::String(message)) => message,
        None | Some(serde_json::Value::Null) => format!("HTTP {status}"),
        Some(other) => other.to_string(),
    };

    Error::Api { status, message }
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Binary file staged for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// Attachment refused by staging checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, displaydoc::Display)]
pub enum AttachmentError {
    /// Будь ласка, виберіть файл зображення
    NotAnImage,
    /// Розмір файлу не повинен перевищувати 5 МБ
    TooLarge,
}

impl Attachment {
    /// Stage an image file.
    ///
    /// # Errors
    ///
    /// Fails if the MIME type is not `image/*` or the file exceeds [`MAX_ATTACHMENT_SIZE`].
    pub fn image(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, AttachmentError> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(AttachmentError::NotAnImage);
        }
        if bytes.len() > MAX_ATTACHMENT_SIZE {
            return Err(AttachmentError::TooLarge);
        }
        Ok(Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        })
    }

    /// Original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type, always `image/*`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Field of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { name: String, value: String },
    File { name: String, attachment: Attachment },
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Json(String),
    Multipart(Vec<Part>),
}

/// Request passed to [`Fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    /// Value of the header `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response returned by [`Fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Platform HTTP client.
pub trait Fetch {
    /// Send `request`. Errors only when no response was received at all.
    fn fetch(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, String>>;
}

/// Options of [`Transport::request()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    /// Serialized JSON, fields in declaration order.
    pub body: Option<String>,
    /// Do not alert the user on failure.
    pub silent: bool,
}

impl RequestOptions {
    /// `GET` without body.
    #[must_use]
    pub const fn get() -> Self {
        Self::new(Method::Get)
    }

    /// `POST` without body.
    #[must_use]
    pub const fn post() -> Self {
        Self::new(Method::Post)
    }

    /// `DELETE` without body.
    #[must_use]
    pub const fn delete() -> Self {
        Self::new(Method::Delete)
    }

    /// Request with a JSON body.
    ///
    /// # Errors
    ///
    /// Fails if `body` can't be serialized.
    pub fn json<B: Serialize + ?Sized>(method: Method, body: &B) -> Result<Self> {
        let body = serde_json::to_string(body).map_err(|err| Error::Encoding(err.to_string()))?;
        Ok(Self {
            body: Some(body),
            ..Self::new(method)
        })
    }

    /// Mark the request as silent.
    #[must_use]
    pub fn silent(self) -> Self {
        Self {
            silent: true,
            ..self
        }
    }

    const fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            silent: false,
        }
    }
}

/// Multipart upload of an [`Attachment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub attachment: Attachment,
    pub client_request_id: Option<String>,
}

impl Upload {
    /// Multipart fields: `file` and optionally `client_request_id`.
    fn into_parts(self) -> Vec<Part> {
        let mut parts = vec![Part::File {
            name: "file".to_owned(),
            attachment: self.attachment,
        }];
        if let Some(client_request_id) = self.client_request_id {
            parts.push(Part::Text {
                name: "client_request_id".to_owned(),
                value: client_request_id,
            });
        }
        parts
    }
}

/// REST API transport.
pub struct Transport {
    config: Config,
    fetch: Rc<dyn Fetch>,
    host: Rc<dyn Host>,
}

impl Transport {
    /// Construct new [`Transport`].
    pub fn new(config: Config, fetch: Rc<dyn Fetch>, host: Rc<dyn Host>) -> Self {
        Self {
            config,
            fetch,
            host,
        }
    }

    /// Call `endpoint` and parse the JSON response.
    ///
    /// Returns `None` for `204 No Content` and for empty or `null` bodies. Unless
    /// [`RequestOptions::silent`] is set, a failure is reported to the user with a single alert.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>> {
        let RequestOptions {
            method,
            body,
            silent,
        } = options;

        let body = body.map_or(Body::Empty, Body::Json);
        let result = self.send(endpoint, method, body).await;

        if let Err(err) = &result {
            error!(%endpoint, method = method.as_str(), %err, silent, "API request failed");
            if !silent {
                self.alert(err);
            }
        }
        result
    }

    /// Call `endpoint` expecting a non-empty response.
    ///
    /// # Errors
    ///
    /// See [`request()`](Self::request). An empty response is [`Error::Malformed`].
    pub async fn request_body<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(endpoint, options)
            .await?
            .ok_or_else(|| Error::Malformed("empty response".to_owned()))
    }

    /// Call `endpoint` ignoring any response body.
    ///
    /// # Errors
    ///
    /// See [`request()`](Self::request).
    pub async fn execute(&self, endpoint: &str, options: RequestOptions) -> Result<()> {
        self.request::<serde::de::IgnoredAny>(endpoint, options)
            .await
            .map(drop)
    }

    /// Upload a file as `multipart/form-data`.
    ///
    /// Never alerts: callers report attachment failures themselves.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub async fn upload<T: DeserializeOwned>(&self, endpoint: &str, upload: Upload) -> Result<Option<T>> {
        debug!(
            %endpoint,
            file = upload.attachment.file_name(),
            client_request_id = upload.client_request_id.as_deref(),
            "Uploading attachment"
        );
        let result = self
            .send(endpoint, Method::Post, Body::Multipart(upload.into_parts()))
            .await;
        if let Err(err) = &result {
            warn!(%endpoint, %err, "Upload failed");
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Body,
    ) -> Result<Option<T>> {
        let url = self
            .config
            .endpoint_url(endpoint)
            .map_err(|err| Error::Encoding(err.to_string()))?;

        let mut headers = vec![(IDENTITY_HEADER.to_owned(), self.host.init_data())];
        if !matches!(body, Body::Multipart(_)) {
            headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
        }

        debug!(%url, method = method.as_str(), "Sending request");
        let response = self
            .fetch
            .fetch(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await
            .map_err(Error::Network)?;

        if !response.is_success() {
            return Err(error_from_response(response.status, &response.body));
        }
        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Option<T>>(&response.body)
            .map_err(|err| Error::Malformed(err.to_string()))
    }

    fn alert(&self, err: &Error) {
        if alert_supported(self.host.as_ref()) {
            self.host.alert(&format!("Помилка: {err}"));
        } else {
            warn!("Alerts are not supported by the host, error is not shown");
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "it's ok in tests")]

    use serde::Deserialize;
    use tokio::test;

    use super::*;
    use crate::test_utils::{FakeFetch, mock_host};

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Created {
        id: u64,
    }

    fn transport(fetch: &Rc<FakeFetch>, host: crate::host::MockHost) -> Transport {
        Transport::new(Config::production(), Rc::clone(fetch) as Rc<dyn Fetch>, Rc::new(host))
    }

    #[test]
    async fn string_detail_is_used_verbatim() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Post, "/api/books", 400, r#"{"detail":"title required"}"#);

        let mut host = mock_host();
        host.expect_alert()
            .withf(|message| message == "Помилка: title required")
            .times(1)
            .return_const(());
        let transport = transport(&fetch, host);

        let options = RequestOptions::json(Method::Post, &serde_json::json!({"title": ""})).unwrap();
        let err = transport
            .request::<Created>("/api/books", options)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "title required");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    async fn identity_and_content_type_headers() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Post, "/api/books", 200, r#"{"id": 3}"#);
        let transport = transport(&fetch, mock_host());

        let options = RequestOptions::json(Method::Post, &serde_json::json!({"title": "A"})).unwrap();
        let created = transport
            .request_body::<Created>("/api/books", options)
            .await
            .unwrap();
        assert_eq!(created, Created { id: 3 });

        let request = fetch.requests().pop().unwrap();
        assert_eq!(
            request.url.as_str(),
            "https://bookclub.uca.co.ua/api/books"
        );
        assert_eq!(request.header(IDENTITY_HEADER), Some("init-data"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body, Body::Json(r#"{"title":"A"}"#.to_owned()));
    }

    #[test]
    async fn json_body_keeps_field_order() {
        let draft = crate::model::ReviewDraft {
            rating: crate::model::Rating::MAX,
            comment: None,
        };
        let options = RequestOptions::json(Method::Post, &draft).unwrap();
        assert_eq!(options.body.as_deref(), Some(r#"{"rating":5,"comment":null}"#));
    }

    #[test]
    async fn no_content_is_none() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Delete, "/api/books/1", 204, "");
        let transport = transport(&fetch, mock_host());

        let result = transport
            .request::<Created>("/api/books/1", RequestOptions::delete())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    async fn unparseable_success_is_malformed() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/my", 200, "<html>");
        let mut host = mock_host();
        host.expect_alert().times(1).return_const(());
        let transport = transport(&fetch, host);

        let err = transport
            .request::<Created>("/api/clubs/my", RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    async fn silent_failure_never_alerts() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/books/1/review", 404, r#"{"detail":"Not found"}"#);
        // No `expect_alert()`: any alert panics.
        let transport = transport(&fetch, mock_host());

        let err = transport
            .request::<Created>("/api/books/1/review", RequestOptions::get().silent())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    async fn network_failure_alerts_once() {
        let fetch = FakeFetch::new();
        fetch.fail(Method::Get, "/api/clubs/my", "Failed to fetch");
        let mut host = mock_host();
        host.expect_alert()
            .withf(|message| message == "Помилка: Failed to fetch")
            .times(1)
            .return_const(());
        let transport = transport(&fetch, host);

        let err = transport
            .request::<Created>("/api/clubs/my", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err, Error::Network("Failed to fetch".to_owned()));
    }

    #[test]
    async fn old_host_does_not_alert() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Get, "/api/clubs/my", 500, "");
        let mut host = crate::host::MockHost::new();
        host.expect_init_data().returning(String::new);
        host.expect_has_alert().return_const(true);
        host.expect_version().returning(|| Some("6.0".to_owned()));
        let transport = transport(&fetch, host);

        let err = transport
            .request::<Created>("/api/clubs/my", RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    async fn upload_is_multipart_and_never_alerts() {
        let fetch = FakeFetch::new();
        fetch.on(Method::Post, "/api/books/4/cover", 500, r#"{"detail":"disk full"}"#);
        let transport = transport(&fetch, mock_host());

        let attachment = Attachment::image("cover.png", "image/png", vec![1, 2, 3]).unwrap();
        let err = transport
            .upload::<serde_json::Value>(
                "/api/books/4/cover",
                Upload {
                    attachment: attachment.clone(),
                    client_request_id: Some("token".to_owned()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        let request = fetch.requests().pop().unwrap();
        assert_eq!(request.header("content-type"), None);
        assert_eq!(request.header(IDENTITY_HEADER), Some("init-data"));
        assert_eq!(
            request.body,
            Body::Multipart(vec![
                Part::File {
                    name: "file".to_owned(),
                    attachment
                },
                Part::Text {
                    name: "client_request_id".to_owned(),
                    value: "token".to_owned()
                },
            ])
        );
    }

    mod error_mapping {
        use super::super::*;

        #[test]
        fn auth_failures_have_fixed_message() {
            for status in [401, 403] {
                let err = error_from_response(status, r#"{"detail":"Invalid init data"}"#);
                assert_eq!(err, Error::SessionExpired { status });
                assert_eq!(err.to_string(), SESSION_EXPIRED_MESSAGE);
            }
        }

        #[test]
        fn structured_detail_is_compact_json() {
            let err = error_from_response(
                422,
                r#"{"detail": [{"loc": ["body", "title"], "msg": "field required"}]}"#,
            );
            assert_eq!(
                err.to_string(),
                r#"[{"loc":["body","title"],"msg":"field required"}]"#
            );
        }

        #[test]
        fn missing_detail_is_status() {
            assert_eq!(error_from_response(502, "Bad gateway").to_string(), "HTTP 502");
            assert_eq!(error_from_response(500, r#"{"error": 1}"#).to_string(), "HTTP 500");
            assert_eq!(error_from_response(500, r#"{"detail": null}"#).to_string(), "HTTP 500");
        }

        #[test]
        fn attachment_staging() {
            assert_eq!(
                Attachment::image("a.pdf", "application/pdf", vec![]).unwrap_err(),
                AttachmentError::NotAnImage
            );
            assert_eq!(
                Attachment::image("a.png", "image/png", vec![0; MAX_ATTACHMENT_SIZE + 1]).unwrap_err(),
                AttachmentError::TooLarge
            );
            assert!(Attachment::image("a.png", "image/png", vec![0; MAX_ATTACHMENT_SIZE]).is_ok());
        }
    }
}
