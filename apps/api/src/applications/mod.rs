// Application tracking: listing, creation from job postings, status changes, cover letters.

pub mod handlers;
pub mod store;
