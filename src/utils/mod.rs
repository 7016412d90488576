pub mod cookies;
pub mod email;
pub mod http;
pub mod password;
pub mod security;
pub mod time;
