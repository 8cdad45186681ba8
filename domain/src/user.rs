pub use entity_api::user::{AuthSession, Backend, Credentials};
