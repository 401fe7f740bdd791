//! Test utilities.

#![cfg(test)]
#![allow(clippy::unwrap_used, clippy::panic)]

use std::{cell::RefCell, rc::Rc, time::Duration};

use futures::{FutureExt as _, future::LocalBoxFuture};
use tokio::sync::oneshot;

use crate::{
    api::Api,
    config::Config,
    context::Context,
    debounce::Timer,
    host::{MockHost, SessionUser},
    transport::{Fetch, HttpRequest, HttpResponse, Method, Transport},
};

/// Init data returned by [`mock_host()`].
pub const INIT_DATA: &str = "init-data";

/// Host with identity and a modern SDK version. Dialogs and haptics must be expected by the test.
pub fn mock_host() -> MockHost {
    let mut host = MockHost::new();
    host.expect_init_data().returning(|| INIT_DATA.to_owned());
    host.expect_has_alert().return_const(true);
    host.expect_version().returning(|| Some("7.0".to_owned()));
    host.expect_session_user()
        .returning(|| Some(SessionUser::development()));
    host.expect_chat().returning(|| None);
    host
}

/// Scripted reply.
enum Reply {
    Ready(Result<HttpResponse, String>),
    Gated(oneshot::Receiver<HttpResponse>),
}

/// Reply to the first not yet served request matching `method` and url path.
struct Rule {
    method: Method,
    path: String,
    reply: Reply,
}

/// [`Fetch`] replaying scripted responses and recording every request.
#[derive(Default)]
pub struct FakeFetch {
    rules: RefCell<Vec<Rule>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeFetch {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Answer the next `method` request to `path` (query ignored) with `status` and `body`.
    pub fn on(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            Reply::Ready(Ok(HttpResponse {
                status,
                body: body.to_owned(),
            })),
        );
    }

    /// Fail the next `method` request to `path` with a network error.
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Reply::Ready(Err(message.to_owned())));
    }

    /// Answer the next `method` request to `path` once the returned sender is used.
    pub fn on_later(&self, method: Method, path: &str) -> oneshot::Sender<HttpResponse> {
        let (sender, receiver) = oneshot::channel();
        self.push(method, path, Reply::Gated(receiver));
        sender
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// Requests sent to `path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method == method && request.url.path() == path)
            .cloned()
            .collect()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.rules.borrow_mut().push(Rule {
            method,
            path: path.to_owned(),
            reply,
        });
    }
}

impl Fetch for FakeFetch {
    fn fetch(&self, request: HttpRequest) -> LocalBoxFuture<'static, Result<HttpResponse, String>> {
        let position = self
            .rules
            .borrow()
            .iter()
            .position(|rule| rule.method == request.method && rule.path == request.url.path());
        let Some(position) = position else {
            panic!("Unexpected request: {} {}", request.method.as_str(), request.url);
        };
        let rule = self.rules.borrow_mut().remove(position);
        self.requests.borrow_mut().push(request);

        match rule.reply {
            Reply::Ready(result) => futures::future::ready(result).boxed_local(),
            Reply::Gated(receiver) => async move {
                receiver
                    .await
                    .map_err(|_closed| "response sender dropped".to_owned())
            }
            .boxed_local(),
        }
    }
}

/// [`Timer`] backed by tokio time, so paused test clocks apply.
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed_local()
    }
}

/// Context wired to `fetch` and `host`.
pub fn context(fetch: &Rc<FakeFetch>, host: MockHost) -> Context {
    let host: Rc<dyn crate::host::Host> = Rc::new(host);
    let config = Config::production();
    let transport = Transport::new(
        config.clone(),
        Rc::clone(fetch) as Rc<dyn Fetch>,
        Rc::clone(&host),
    );
    Context::new(config, Api::new(transport), host, Rc::new(TokioTimer))
}

/// Minimal club JSON with `id`, `name` and `role`.
pub fn club_json(id: u64, name: &str, role: &str) -> String {
    format!(
        r#"{{"id": {id}, "name": "{name}", "owner_id": "1", "invite_code": "CODE{id}",
            "created_at": "2024-01-01T00:00:00", "user_role": "{role}"}}"#
    )
}

/// Minimal book JSON with `id`, `title` and `status`.
pub fn book_json(id: u64, title: &str, status: &str) -> String {
    format!(
        r#"{{"id": {id}, "title": "{title}", "author": "Автор", "owner_id": "1",
            "status": "{status}", "created_at": "2024-01-01T00:00:00"}}"#
    )
}
