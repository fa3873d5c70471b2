mod memory;
mod repo;
mod repo_types;
mod services;

pub use memory::InMemoryUserStore;
pub use repo::{PgUserStore, UserStore};
pub use repo_types::UserAccount;
pub use services::AccountService;
