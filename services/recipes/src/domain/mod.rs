pub mod repository;
pub mod shopping_list;
pub mod types;
pub mod validation;
