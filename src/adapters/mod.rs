pub mod media;
pub mod repositories;
pub mod store;
