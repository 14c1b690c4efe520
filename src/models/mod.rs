pub mod resource;
pub mod user;

pub use resource::{Folder, Note};
pub use user::{CreateUser, User};
