mod session;

pub use session::{BrowserConfig, BrowserKind, new_session};
