pub mod accounts;
pub mod password;

pub use accounts::AccountService;
pub use password::PasswordService;
