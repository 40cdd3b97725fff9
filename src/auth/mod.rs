//! Authentication and session state.
//!
//! [`AuthContext`] holds the signed-in user, persists it through a
//! [`SessionStorage`] and reports view changes through a [`Navigator`].

mod context;
mod error;
mod navigation;
mod session;
mod shapes;
mod storage;

pub use context::{AuthBackend, AuthContext, AuthState, RegisterOutcome};
pub use error::{AuthError, StorageError};
pub use navigation::{LogNavigator, Navigator, RecordingNavigator, Route};
pub use session::{DEFAULT_AVATAR, SESSION_STORAGE_KEY, SessionUser};
pub use shapes::{LoginShape, RegisterShape, classify_login, classify_register};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
