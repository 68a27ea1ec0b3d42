pub mod config;
pub mod credentials;
pub mod error;
pub mod paths;
pub mod task;

pub use config::Config;
pub use credentials::{CredentialStore, EnvCredentials, Secret, StaticCredentials};
pub use error::{Error, Result};
pub use paths::Paths;
pub use task::Task;
