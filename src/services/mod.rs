//! Dashboard services: caching, list derivation, forms and notices

pub mod cache;
pub mod dashboard;
pub mod listing;
pub mod notify;
pub mod seed;
pub mod validation;

pub use cache::{BookCache, Freshness, Mutation, MutationOutcome};
pub use dashboard::Dashboard;
pub use listing::{GenreFilter, ListState, Page, StatusFilter};
pub use notify::{MutationKind, Notice, NoticeLevel, Notifier};
pub use validation::{BookForm, FieldErrors};
