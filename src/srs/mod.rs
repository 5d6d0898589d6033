pub mod scheduler;
pub mod session;

pub use scheduler::apply_outcome;
pub use session::{select_next_card, StudySession};
