pub mod contact;
pub mod repository;

pub use contact::*;
pub use repository::*;
