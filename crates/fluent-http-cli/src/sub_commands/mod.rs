pub mod field;
pub mod json;
pub mod text;
