mod credentials;
mod dispatch;
mod session;

pub use credentials::*;
pub use dispatch::*;
pub use session::*;
