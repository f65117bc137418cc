// src/lib.rs

//! Regional bestseller list tracker library.
//!
//! [`parse_list`] turns a weekly plain-text list into categories of ranked
//! books; [`compare_lists`] annotates one week against the previous one.

pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use parser::parse_list;
pub use pipeline::compare_lists;
