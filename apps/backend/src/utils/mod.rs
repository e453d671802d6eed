pub mod join_code;
pub mod session_token;
