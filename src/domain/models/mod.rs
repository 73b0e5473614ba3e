mod auth;
mod campaign;
mod event;
mod gateway;
mod send;
mod session;
mod template;

pub use auth::*;
pub use campaign::*;
pub use event::*;
pub use gateway::*;
pub use send::*;
pub use session::*;
pub use template::*;
