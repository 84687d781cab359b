//! Call provider credential selection
//!
//! The active key comes from the first non-empty candidate in:
//! - the key the user just typed
//! - the key the user saved earlier (persisted slot)
//! - the deployment's environment default
//! - a hardcoded public fallback

mod resolver;
mod store;

pub use resolver::{Credential, CredentialResolver, CredentialSource, FALLBACK_PUBLIC_KEY, MANUAL_KEY_SLOT};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
