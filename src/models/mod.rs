pub mod blog;
pub mod category;
pub mod comment;
pub mod notification;
pub mod response;
pub mod user;
