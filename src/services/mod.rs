pub mod comment_store;
pub mod follow_graph;
pub mod post_store;
pub mod response;
pub mod user_directory;
