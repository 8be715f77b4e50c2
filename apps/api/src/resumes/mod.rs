// Resume storage and resume ↔ job matching endpoints.

pub mod handlers;
pub mod store;
pub mod upload;
