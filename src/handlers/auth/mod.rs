pub mod password;
pub mod session;

pub use password::{change_password, request_password_reset, restore_password};
pub use session::{login, logout, refresh, validate};
