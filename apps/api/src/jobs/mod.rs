// Job discovery through RSS/Atom feeds.

pub mod feed;
pub mod handlers;
