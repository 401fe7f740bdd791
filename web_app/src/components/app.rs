//! Root component: bootstrap, shared state and view switching.

use std::{future::Future, rc::Rc};

use bookclub_client::{
    Context,
    api::Api,
    config::Config,
    controller::{
        self, ActivityController, BookFormController, BooksController, ClubsController,
        MembersController, ProfileController, RequestsController, ReviewsController, Shell,
    },
    host::{DevHost, Host, Launch, ThemeParams},
    transport::{Fetch, Transport},
    view::{Back, View},
};
use leptos::*;
use tracing::{debug, error, info};
use wasm_bindgen::JsCast as _;

use super::{
    activity::ActivityScreen, book_form::BookFormScreen, club_admin::MembersScreen,
    club_admin::RequestsScreen, club_detail::ClubDetailScreen, clubs::ClubsScreen,
    profile::ProfileScreen, review::ReviewScreen,
};
use crate::{fetch::BrowserFetch, host::TelegramHost, tg_api, timer::BrowserTimer};

/// Every controller of the app.
pub struct Controllers {
    pub context: Rc<Context>,
    pub shell: Shell,
    pub clubs: Rc<ClubsController>,
    pub members: Rc<MembersController>,
    pub requests: RequestsController,
    pub books: Rc<BooksController>,
    pub book_form: BookFormController,
    pub reviews: ReviewsController,
    pub activity: ActivityController,
    pub profile: ProfileController,
}

impl Controllers {
    fn new(context: Context, launch: Launch) -> Self {
        let context = Rc::new(context);
        let clubs = Rc::new(ClubsController::new(Rc::clone(&context)));
        let members = Rc::new(MembersController::new(Rc::clone(&context)));
        let books = Rc::new(BooksController::new(Rc::clone(&context)));
        Self {
            shell: Shell::new(Rc::clone(&context), launch, Rc::clone(&clubs)),
            requests: RequestsController::new(Rc::clone(&context), Rc::clone(&members)),
            book_form: BookFormController::new(Rc::clone(&context), Rc::clone(&books)),
            reviews: ReviewsController::new(Rc::clone(&context), Rc::clone(&books)),
            activity: ActivityController::new(Rc::clone(&context)),
            profile: ProfileController::new(Rc::clone(&context)),
            clubs,
            members,
            books,
            context,
        }
    }
}

/// Handle to the controllers which re-renders views after every action.
///
/// Controllers keep their state in plain cells, so views subscribe to a single trigger
/// notified whenever an action starts or ends.
#[derive(Clone, Copy)]
pub struct Ui {
    app: StoredValue<Rc<Controllers>>,
    changed: Trigger,
}

impl Ui {
    /// Controllers without subscribing.
    pub fn get(self) -> Rc<Controllers> {
        self.app.get_value()
    }

    /// Controllers, re-running the caller on every change.
    pub fn track(self) -> Rc<Controllers> {
        self.changed.track();
        self.get()
    }

    /// Run an action on the event loop.
    pub fn spawn(self, task: impl Future<Output = ()> + 'static) {
        self.changed.notify();
        spawn_local(async move {
            task.await;
            self.changed.notify();
        });
    }

    /// Re-render after a synchronous state change.
    pub fn refresh(self) {
        self.changed.notify();
    }

    /// Show `view`.
    pub fn navigate(self, view: View) {
        self.get().shell.navigate(view);
        self.changed.notify();
    }

    /// Go to the parent view.
    pub fn back(self) {
        let app = self.get();
        match app.shell.back() {
            Back::To(View::ClubsList) => {
                app.clubs.close();
                self.spawn(async move { logged(app.clubs.load().await) });
            }
            Back::To(View::ClubDetail { club_id }) => {
                self.spawn(async move { app.clubs.refresh_detail(club_id).await });
            }
            Back::To(_) | Back::Close => self.changed.notify(),
        }
    }
}

/// Controllers from the context.
#[expect(clippy::expect_used, reason = "provided by the root component")]
pub fn use_ui() -> Ui {
    use_context::<Ui>().expect("Ui is provided by App")
}

/// Drop a failed action result. The controller already told the user.
pub fn logged<T>(result: controller::Result<T>) {
    if let Err(err) = result {
        debug!(%err, "Action finished with an error");
    }
}

/// Main component.
#[component]
pub fn App() -> impl IntoView {
    let Some(window) = web_sys::window() else {
        return view! { <InitFailed/> }.into_view();
    };
    let location = window.location();
    let hostname = location.hostname().unwrap_or_default();
    let search = location.search().unwrap_or_default();
    let config = match Config::detect(&hostname, &search) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "Invalid configuration");
            return view! { <InitFailed/> }.into_view();
        }
    };

    let telegram = tg_api::web_app().map(TelegramHost::new);
    let init_data = telegram
        .as_ref()
        .map(|telegram| telegram.init_data())
        .unwrap_or_default();
    let launch = Launch::resolve(telegram.is_some(), &init_data, config.development);
    info!(?launch, api = %config.api_base_url, "Launching");

    if !launch.runs_app() {
        return view! { <Landing bot_link=config.bot_link.to_string()/> }.into_view();
    }

    let telegram = telegram
        .filter(|_| launch == Launch::Telegram)
        .map(Rc::new);
    let host: Rc<dyn Host> = match &telegram {
        Some(telegram) => Rc::clone(telegram) as Rc<dyn Host>,
        None => Rc::new(DevHost),
    };
    let transport = Transport::new(
        config.clone(),
        Rc::new(BrowserFetch) as Rc<dyn Fetch>,
        Rc::clone(&host),
    );
    let context = Context::new(config, Api::new(transport), host, Rc::new(BrowserTimer));
    let app = Rc::new(Controllers::new(context, launch));

    let ui = Ui {
        app: store_value(Rc::clone(&app)),
        changed: create_trigger(),
    };
    provide_context(ui);

    if let Some(telegram) = &telegram {
        telegram.on_theme_changed(|theme| apply_theme(&theme));
        telegram.on_back(move || ui.back());
    }
    apply_theme(&app.shell.theme());
    ui.spawn(async move {
        app.shell.start().await;
    });

    // Screens are rebuilt only when the active view changes, keeping their inputs intact.
    let active = create_memo(move |_| ui.track().shell.active());

    view! {
        <div class="app">
            <Show when=move || ui.track().shell.is_loading()>
                <div class="loading">"Завантаження..."</div>
            </Show>
            {move || {
                match active.get() {
                    View::ClubsList => view! { <ClubsScreen/> }.into_view(),
                    View::ClubDetail { club_id } => view! { <ClubDetailScreen club_id=club_id/> }.into_view(),
                    View::ClubRequests { club_id } => view! { <RequestsScreen club_id=club_id/> }.into_view(),
                    View::ClubMembers { club_id } => view! { <MembersScreen club_id=club_id/> }.into_view(),
                    View::BookForm { .. } => view! { <BookFormScreen/> }.into_view(),
                    View::BookReview { .. } => view! { <ReviewScreen/> }.into_view(),
                    View::Activity { club_id } => view! { <ActivityScreen club_id=club_id/> }.into_view(),
                    View::Profile => view! { <ProfileScreen/> }.into_view(),
                }
            }}
        </div>
    }
    .into_view()
}

/// Screenshots shown on the landing page.
const LANDING_SLIDES: [&str; 3] = [
    "images/landing_clubs.png",
    "images/landing_books.png",
    "images/landing_activity.png",
];

/// Page shown outside of Telegram.
#[component]
fn Landing(bot_link: String) -> impl IntoView {
    let (slide, set_slide) = create_signal(0_usize);
    let step = move |forward: bool| {
        set_slide.update(|slide| {
            *slide = if forward {
                (*slide + 1) % LANDING_SLIDES.len()
            } else {
                (*slide + LANDING_SLIDES.len() - 1) % LANDING_SLIDES.len()
            };
        });
    };

    view! {
        <div class="landing">
            <h1>"📚 Книжковий клуб"</h1>
            <ul class="features">
                <li>"📖 Спільна бібліотека вашого чату"</li>
                <li>"🔄 Позичайте та повертайте книги"</li>
                <li>"⭐ Відгуки та рейтинги"</li>
                <li>"📰 Стрічка активності клубу"</li>
            </ul>
            <div class="carousel">
                <button type="button" on:click=move |_| step(false)>"‹"</button>
                <img src=move || LANDING_SLIDES.get(slide.get()).copied().unwrap_or_default() alt="Знімок екрана"/>
                <button type="button" on:click=move |_| step(true)>"›"</button>
            </div>
            <p>"Цей застосунок працює всередині Telegram."</p>
            <a class="button" href=bot_link>"Відкрити в Telegram"</a>
        </div>
    }
}

#[component]
fn InitFailed() -> impl IntoView {
    view! { <div class="error">"Помилка ініціалізації додатку"</div> }
}

/// Expose the host theme as CSS custom properties on the document root.
fn apply_theme(theme: &ThemeParams) {
    let Some(root) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element())
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        return;
    };
    let style = root.style();
    for (name, value) in theme.css_variables() {
        if let Err(err) = style.set_property(&name, value) {
            debug!(?err, %name, "Failed to set theme variable");
        }
    }
}
