pub mod bulk;
pub mod document;
pub mod server_info;
