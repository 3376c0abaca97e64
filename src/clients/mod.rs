pub mod users;

pub use users::{HttpUserDirectory, UserDirectory};
