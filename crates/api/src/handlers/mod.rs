pub mod industries;
pub mod jobs;
pub mod reviews;
