//! ENS lookup flow: the input form publishes a query, the session resolves
//! it through an [`EnsBackend`], and [`render`] maps the resulting state to a
//! view.

pub mod backend;
pub mod cache;
pub mod fetch;
pub mod form;
pub mod session;
pub mod view;

pub use backend::EnsBackend;
pub use cache::CachedBackend;
pub use fetch::Fetch;
pub use form::LookupForm;
pub use session::{resolve_once, LookupSession, ResolutionSnapshot};
pub use view::{render, ProfileView, View, GENERIC_ERROR_MESSAGE, NO_RECORDS_MESSAGE};
