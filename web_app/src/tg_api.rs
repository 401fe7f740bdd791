//! Telegram JS API bindings.

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Telegram Web App object initialized by a Telegram JS script: <https://telegram.org/js/telegram-web-app.js>.
    ///
    /// For all possible methods and fields see <https://core.telegram.org/bots/webapps#initializing-mini-apps>.
    pub type WebApp;

    /// A string with raw data transferred to the Mini App, signed by the bot.
    #[wasm_bindgen(method, getter, js_name = initData)]
    pub fn init_data(this: &WebApp) -> Option<String>;

    /// An object with input data transferred to the Mini App. Not trusted.
    #[wasm_bindgen(method, getter, js_name = initDataUnsafe)]
    pub fn init_data_unsafe(this: &WebApp) -> JsValue;

    /// The version of the Bot API available in the user's Telegram app.
    #[wasm_bindgen(method, getter)]
    pub fn version(this: &WebApp) -> Option<String>;

    /// An object containing the current theme settings used in the Telegram app.
    #[wasm_bindgen(method, getter, js_name = themeParams)]
    pub fn theme_params(this: &WebApp) -> JsValue;

    /// An object for controlling haptic feedback.
    #[wasm_bindgen(method, getter, js_name = HapticFeedback)]
    pub fn haptic_feedback(this: &WebApp) -> HapticFeedback;

    /// An object for controlling the back button shown in the header.
    #[wasm_bindgen(method, getter, js_name = BackButton)]
    pub fn back_button(this: &WebApp) -> BackButton;

    /// A method that informs the Telegram app that the Mini App is ready to be displayed.
    #[wasm_bindgen(method)]
    pub fn ready(this: &WebApp);

    /// A method that expands the Mini App to the maximum available height.
    #[wasm_bindgen(method)]
    pub fn expand(this: &WebApp);

    /// A method that closes the Mini App.
    #[wasm_bindgen(method)]
    pub fn close(this: &WebApp);

    /// A method that shows a message in a simple alert with a 'Close' button.
    #[wasm_bindgen(method, catch, js_name = showAlert)]
    pub fn show_alert(this: &WebApp, message: &str) -> Result<(), JsValue>;

    /// A method that shows a message in a simple confirmation window with 'OK' and 'Cancel'
    /// buttons. The callback receives whether the user pressed 'OK'.
    #[wasm_bindgen(method, catch, js_name = showConfirm)]
    pub fn show_confirm(
        this: &WebApp,
        message: &str,
        callback: &Closure<dyn FnMut(bool)>,
    ) -> Result<(), JsValue>;

    /// A method that sets the app event handler.
    #[wasm_bindgen(method, js_name = onEvent)]
    pub fn on_event(this: &WebApp, event_type: &str, handler: &Function);

    /// Haptic feedback controller.
    pub type HapticFeedback;

    /// A method tells that an impact occurred.
    #[wasm_bindgen(method, js_name = impactOccurred)]
    pub fn impact_occurred(this: &HapticFeedback, style: &str);

    /// A method tells that a task or action has succeeded, failed, or produced a warning.
    #[wasm_bindgen(method, js_name = notificationOccurred)]
    pub fn notification_occurred(this: &HapticFeedback, kind: &str);

    /// Back button controller.
    pub type BackButton;

    #[wasm_bindgen(method)]
    pub fn show(this: &BackButton);

    #[wasm_bindgen(method)]
    pub fn hide(this: &BackButton);

    /// A method that sets the button press event handler.
    #[wasm_bindgen(method, js_name = onClick)]
    pub fn on_click(this: &BackButton, handler: &Function);
}

/// `window.Telegram.WebApp` if the Telegram script is loaded.
pub fn web_app() -> Option<WebApp> {
    let window = web_sys::window()?;
    let telegram = Reflect::get(&window, &JsValue::from_str("Telegram")).ok()?;
    if telegram.is_undefined() || telegram.is_null() {
        return None;
    }
    let web_app = Reflect::get(&telegram, &JsValue::from_str("WebApp")).ok()?;
    if web_app.is_undefined() || web_app.is_null() {
        return None;
    }

    // `WebApp` is not a class, so checked casts like `dyn_into` fail.
    Some(web_app.unchecked_into::<WebApp>())
}

/// Whether `object` has a property `name`. Older clients miss some of the API.
pub fn has(object: &JsValue, name: &str) -> bool {
    Reflect::get(object, &JsValue::from_str(name))
        .is_ok_and(|value| !value.is_undefined() && !value.is_null())
}
