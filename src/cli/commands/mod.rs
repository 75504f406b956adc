mod init;
mod user;

pub use init::cmd_init;
pub use user::{cmd_user_add, cmd_user_list, cmd_user_remove};
