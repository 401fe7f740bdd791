//! Club screen: club info, its books and the book detail panel.

use bookclub_client::{
    api::SortKey,
    controller::Outcome,
    format,
    model::{Book, BookDetail, BookId, BookStatus, ClubDetail, ClubId, LoanStatus, Role},
    mutation::{ClubDraft, Target},
    view::{BookFormMode, Detail, View},
};
use leptos::*;
use wasm_bindgen_futures::JsFuture;

use super::{
    Ui,
    clubs::ClubForm,
    common::{Avatar, Cover, ScreenHeader, Stars},
    logged, use_ui,
};

#[component]
pub fn ClubDetailScreen(club_id: ClubId) -> impl IntoView {
    let ui = use_ui();
    let (editing, set_editing) = create_signal(false);
    let (pending, set_pending) = create_signal(0_usize);

    ui.spawn(async move {
        let app = ui.get();
        logged(app.books.open_club(club_id).await);
        if app.clubs.role().is_some_and(Role::can_manage) {
            set_pending.set(app.clubs.pending_requests(club_id).await);
        }
    });

    let title = move || {
        ui.track()
            .clubs
            .detail()
            .data()
            .map(|detail| detail.club.name.clone())
            .unwrap_or_default()
    };

    let info = move || match ui.track().clubs.detail() {
        Detail::Ready { data, .. } => {
            view! { <ClubInfo detail=data pending=pending set_editing=set_editing/> }.into_view()
        }
        Detail::Loading { .. } => view! { <div class="loading">"Завантаження..."</div> }.into_view(),
        Detail::Failed { .. } => view! {
            <div class="error">
                <p>"Не вдалося завантажити клуб"</p>
                <button type="button" on:click=move |_| {
                    ui.spawn(async move { ui.get().clubs.refresh_detail(club_id).await });
                }>"Спробувати ще раз"</button>
            </div>
        }
        .into_view(),
        Detail::Closed => ().into_view(),
    };

    let edit_form = move || {
        let detail = ui.get().clubs.detail();
        let club = &detail.data()?.club;
        let initial = ClubDraft {
            name: club.name.clone(),
            description: club.description.clone().unwrap_or_default(),
            is_public: club.is_public,
            requires_approval: club.requires_approval,
        };
        Some(view! {
            <ClubForm target=Target::Update(club_id) initial=initial
                on_done=move || set_editing.set(false)/>
        })
    };

    view! {
        <ScreenHeader title=title()>
            <button type="button" on:click=move |_| ui.navigate(View::Activity { club_id })>"📰"</button>
        </ScreenHeader>
        {move || if editing.get() { edit_form().into_view() } else { info().into_view() }}
        <BooksSection club_id=club_id/>
        <BookDetailPanel/>
    }
}

#[component]
fn ClubInfo(
    detail: ClubDetail,
    pending: ReadSignal<usize>,
    set_editing: WriteSignal<bool>,
) -> impl IntoView {
    let ui = use_ui();
    let club = detail.club;
    let club_id = club.id;
    let role = club.role();
    let invite_code = (!club.is_public).then(|| club.invite_code.clone());

    let on_delete = move |_| {
        ui.spawn(async move {
            if let Ok(Outcome::Done) = ui.get().clubs.delete(club_id).await {
                ui.navigate(View::ClubsList);
            }
        });
    };

    view! {
        <section class="club-info">
            <Avatar url=club.avatar().map(ToOwned::to_owned)/>
            <p class="club-description">{club.description.clone()}</p>
            <p class="club-meta">
                {format::role_label(role)} " · " {format::members_count(u32::try_from(detail.members.len()).unwrap_or(u32::MAX))}
            </p>
            {invite_code.map(|code| view! { <InviteCode code=code/> })}
            <div class="club-actions">
                <button type="button" on:click=move |_| ui.navigate(View::ClubMembers { club_id })>
                    "👥 Учасники"
                </button>
                <Show when=move || role.can_manage()>
                    <button type="button" on:click=move |_| ui.navigate(View::ClubRequests { club_id })>
                        "📨 Заявки " {move || (pending.get() > 0).then(|| format!("({})", pending.get()))}
                    </button>
                </Show>
                <Show when=move || role == Role::Owner>
                    <button type="button" on:click=move |_| set_editing.set(true)>"✏️ Редагувати"</button>
                    <button type="button" class="danger" on:click=on_delete>"🗑 Видалити клуб"</button>
                </Show>
            </div>
        </section>
    }
}

/// Invite code with a copy button.
#[component]
pub fn InviteCode(code: String) -> impl IntoView {
    let ui = use_ui();
    let shown = code.clone();
    let on_copy = move |_| {
        let code = code.clone();
        spawn_local(async move {
            let copied = match web_sys::window() {
                Some(window) => {
                    let promise = window.navigator().clipboard().write_text(&code);
                    JsFuture::from(promise).await.is_ok()
                }
                None => false,
            };
            ui.get().clubs.report_copy(&code, copied);
        });
    };
    view! {
        <div class="invite-code">
            <span>"Код запрошення: "</span>
            <code>{shown}</code>
            <button type="button" on:click=on_copy>"📋"</button>
        </div>
    }
}

#[component]
fn BooksSection(club_id: ClubId) -> impl IntoView {
    let ui = use_ui();
    let query = ui.get().books.query();

    let on_search = move |event| {
        let text = event_target_value(&event);
        ui.spawn(async move { logged(ui.get().books.search(&text).await) });
    };
    let on_sort = move |event| {
        let Some(sort) = SortKey::from_query(&event_target_value(&event)) else {
            return;
        };
        ui.spawn(async move { logged(ui.get().books.set_sort(sort).await) });
    };
    let on_add = move |_| {
        let mode = BookFormMode::Create { club_id };
        ui.get().book_form.open_create(club_id);
        ui.navigate(View::BookForm { mode });
    };

    let books = move || {
        let books = ui.track().books.books();
        if books.is_empty() {
            return view! { <div class="empty-state">"Книг поки немає"</div> }.into_view();
        }
        books
            .into_iter()
            .map(|book| view! { <BookCard book=book/> })
            .collect_view()
    };

    view! {
        <section class="books">
            <div class="books-toolbar">
                <input type="search" placeholder="🔍 Пошук книг" value=query.search on:input=on_search/>
                <select on:change=on_sort>
                    {SortKey::ALL
                        .into_iter()
                        .map(|sort| view! {
                            <option value=sort.as_query() selected=sort == query.sort>{sort.label()}</option>
                        })
                        .collect_view()}
                </select>
                <button type="button" on:click=on_add>"➕ Додати книгу"</button>
            </div>
            <div class="books-list">{books}</div>
        </section>
    }
}

#[component]
fn BookCard(book: Book) -> impl IntoView {
    let ui = use_ui();
    let book_id = book.id;
    let status = match book.status {
        BookStatus::Available => "✅ Доступна",
        BookStatus::Reading => "📖 Читається",
        BookStatus::Deleted => "Видалена",
    };
    let holder = book
        .holder_name
        .clone()
        .or_else(|| book.holder_username.clone())
        .filter(|_| book.status == BookStatus::Reading);

    let on_open = move |_| {
        ui.spawn(async move { logged(ui.get().books.open_detail(book_id).await) });
    };

    view! {
        <div class="book-card">
            <div class="book-card-main" on:click=on_open>
                <Cover url=book.cover().map(ToOwned::to_owned)/>
                <div class="book-card-info">
                    <div class="book-title">{book.title.clone()}</div>
                    <div class="book-author">{book.author.clone()}</div>
                    <div class="book-status">{status} {holder.map(|holder| format!(" · {holder}"))}</div>
                    {book.average_rating.map(|rating| view! { <Stars rating=rating/> })}
                </div>
            </div>
            <BookActionsBar book=book/>
        </div>
    }
}

/// Buttons for what the user may do with `book`.
#[component]
fn BookActionsBar(book: Book) -> impl IntoView {
    let ui = use_ui();
    let book_id = book.id;
    let actions = ui.get().books.actions(&book);

    let borrow = move |_| ui.spawn(async move { logged(ui.get().books.borrow(book_id).await) });
    let give_back =
        move |_| ui.spawn(async move { logged(ui.get().books.return_book(book_id).await) });
    let delete = move |_| ui.spawn(async move { logged(ui.get().books.delete(book_id).await) });

    view! {
        <div class="book-actions">
            {actions.can_borrow.then(|| view! {
                <button type="button" on:click=borrow>"📚 Взяти"</button>
            })}
            {actions.can_return.then(|| view! {
                <button type="button" on:click=give_back>"🔙 Повернути"</button>
            })}
            {actions.can_edit.then(|| view! {
                <button type="button" on:click=move |_| edit_book(ui, book_id)>"✏️"</button>
                <button type="button" class="danger" on:click=delete>"🗑"</button>
            })}
            <button type="button" on:click=move |_| review_book(ui, book_id)>"⭐ Відгук"</button>
        </div>
    }
}

fn edit_book(ui: Ui, book_id: BookId) {
    ui.get().books.close_detail();
    ui.navigate(View::BookForm {
        mode: BookFormMode::Edit { book_id },
    });
    ui.spawn(async move { logged(ui.get().book_form.open_edit(book_id).await) });
}

fn review_book(ui: Ui, book_id: BookId) {
    ui.navigate(View::BookReview { book_id });
    ui.spawn(async move { ui.get().reviews.open(book_id).await });
}

/// Detail of the open book: history and reviews.
#[component]
fn BookDetailPanel() -> impl IntoView {
    let ui = use_ui();
    let close = move |_| {
        ui.get().books.close_detail();
        ui.refresh();
    };

    move || {
        let content = match ui.track().books.detail() {
            Detail::Closed => return ().into_view(),
            Detail::Loading { .. } => view! { <div class="loading">"Завантаження..."</div> }.into_view(),
            Detail::Failed { id } => view! {
                <div class="error">
                    <p>"Не вдалося завантажити книгу"</p>
                    <button type="button" on:click=move |_| {
                        ui.spawn(async move { logged(ui.get().books.open_detail(id).await) });
                    }>"Спробувати ще раз"</button>
                </div>
            }
            .into_view(),
            Detail::Ready { data, .. } => view! { <BookDetailBody detail=data/> }.into_view(),
        };
        view! {
            <div class="modal">
                <div class="modal-content">
                    <button type="button" class="modal-close" on:click=close>"✕"</button>
                    {content}
                </div>
            </div>
        }
        .into_view()
    }
}

#[component]
fn BookDetailBody(detail: BookDetail) -> impl IntoView {
    let now = chrono::Utc::now();
    let book = detail.book;

    let loans = detail
        .loans
        .into_iter()
        .map(|loan| {
            let who = loan.user_name.clone().unwrap_or_else(|| loan.username.clone());
            let period = match (loan.status, loan.returned_at) {
                (LoanStatus::Returned, Some(returned)) => {
                    format!("{} – {}", loan.borrowed_at.date(), returned.date())
                }
                (LoanStatus::Waiting, _) => "в черзі".to_owned(),
                _ => format!("з {}", loan.borrowed_at.date()),
            };
            view! { <li>{who} " · " {period}</li> }
        })
        .collect_view();

    let reviews = detail
        .reviews
        .into_iter()
        .map(|review| {
            view! {
                <li class="review">
                    <div>
                        <b>{review.author().to_owned()}</b> " "
                        {format::stars(review.rating.stars())}
                    </div>
                    {review.comment.clone().map(|comment| view! { <p>{comment}</p> })}
                    <div class="meta">{format::relative_time(review.created_at, now)}</div>
                </li>
            }
        })
        .collect_view();

    view! {
        <Cover url=book.cover().map(ToOwned::to_owned)/>
        <h3>{book.title.clone()}</h3>
        <p class="book-author">{book.author.clone()}</p>
        {book.average_rating.map(|rating| view! { <Stars rating=rating/> })}
        {book.description.clone().map(|description| view! { <p class="book-description">{description}</p> })}
        <p class="meta">"Додано " {book.created_at.date()}
            {book.owner_name.clone().map(|owner| format!(" · {owner}"))}</p>
        <BookActionsBar book=book/>
        <h4>"📖 Історія читання"</h4>
        <ul class="loans">{loans}</ul>
        <h4>"⭐ Відгуки"</h4>
        <ul class="reviews">{reviews}</ul>
    }
}
