pub mod post;
pub mod request;
pub mod user;
