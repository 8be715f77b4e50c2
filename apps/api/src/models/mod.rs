pub mod application;
pub mod contact;
pub mod job_posting;
pub mod resume;
