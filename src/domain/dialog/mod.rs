//! Dialog module - sessions, turns, modes and upstream targets.

mod errors;
mod mode;
mod session;
mod target;
mod turn;

pub use errors::DialogError;
pub use mode::{Mode, ModeSelector};
pub use session::{session_name_for, Session, SESSION_NAME_CHARS};
pub use target::{EnvelopeStyle, UpstreamKind, UpstreamTarget};
pub use turn::{DialogTurn, NewDialogTurn, Question};
