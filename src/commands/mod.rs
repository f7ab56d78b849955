pub mod boards;
pub mod init;
pub mod issues;
pub mod users;
