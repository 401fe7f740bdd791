//! Typed clients of the REST API grouped by resource.

use crate::transport::Transport;

pub mod books;
pub mod clubs;
pub mod user;

pub use books::{BookQuery, Books, SortKey};
pub use clubs::{ActivityQuery, Clubs};
pub use user::User;

/// Entry point to all resource clients.
pub struct Api {
    transport: Transport,
}

impl Api {
    /// Construct new [`Api`].
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Books, loans, reviews and metadata search.
    pub const fn books(&self) -> Books<'_> {
        Books::new(&self.transport)
    }

    /// Clubs, memberships, join requests and activity.
    pub const fn clubs(&self) -> Clubs<'_> {
        Clubs::new(&self.transport)
    }

    /// Current user and service health.
    pub const fn user(&self) -> User<'_> {
        User::new(&self.transport)
    }
}

/// Build `path?query` from key-value pairs, skipping the `?` if there are none.
fn with_query<'a>(path: &str, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(pairs);
    let query = serializer.finish();
    if query.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{query}")
    }
}
