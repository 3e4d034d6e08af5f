pub mod auth;
pub mod mode;
pub mod response;
pub mod submission;

pub use auth::{clear_session, establish_session, AuthUser, Identity, LAST_LOGIN_COOKIE, SESSION_COOKIE};
pub use mode::ResponseMode;
pub use response::ApiResponse;
pub use submission::Submission;
