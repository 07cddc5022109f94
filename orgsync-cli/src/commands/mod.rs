pub mod find_secret;
pub mod sync;
