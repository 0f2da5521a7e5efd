pub mod auth;
pub mod collection;
pub mod ingredient;
pub mod recipe;
pub mod shopping_list;
pub mod subscription;
pub mod tag;
pub mod user;
pub mod view;

#[cfg(test)]
pub(crate) mod fakes;
