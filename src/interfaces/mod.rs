pub mod csv;
pub mod json;
pub mod request;
pub mod script;
