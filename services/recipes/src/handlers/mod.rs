pub mod auth;
pub mod identity;
pub mod ingredient;
pub mod pagination;
pub mod recipe;
pub mod subscription;
pub mod tag;
pub mod user;
