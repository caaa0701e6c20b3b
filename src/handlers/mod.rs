pub mod checks;
pub mod ping;
pub mod tokens;
pub mod users;
