pub mod origin;
pub mod security_headers;
