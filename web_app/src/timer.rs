//! [`Timer`] over `setTimeout`.

use std::time::Duration;

use bookclub_client::debounce::Timer;
use futures::{FutureExt as _, future::LocalBoxFuture};
use js_sys::Promise;
use wasm_bindgen_futures::JsFuture;

/// Browser timer.
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _handle = window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
            }
        });
        async move {
            let _ignored = JsFuture::from(promise).await;
        }
        .boxed_local()
    }
}
