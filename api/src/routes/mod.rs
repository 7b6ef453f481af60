pub mod courses;
pub mod query;
