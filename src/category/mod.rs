//! Category management for the affiliate backend.

mod create;
mod db;
mod delete;
mod domain;
mod form;
mod list;
mod update;

pub use create::create_category_endpoint;
pub use db::{
    create_category_table, delete_category, get_all_categories, get_category, insert_category,
    update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName, CategoryUpdate, NewCategory};
pub use list::list_categories_endpoint;
pub use update::update_category_endpoint;
