pub mod cleanup;
pub mod gate;
pub mod middleware;
pub mod session;

pub use cleanup::run_cleanup_worker;
pub use gate::{token_required, Authorization};
pub use middleware::{get_session_token, session_layer, Session};
pub use session::{generate_session_token, SessionData, SessionStore};
