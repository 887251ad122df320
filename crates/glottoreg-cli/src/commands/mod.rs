pub mod build;
pub mod import;
pub mod link_check;
pub mod pipeline;
pub mod quality;
pub mod schema;
pub mod shared;
pub mod validate;
