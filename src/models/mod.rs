pub mod message;
pub mod photo;
