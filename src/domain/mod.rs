pub mod mastery;
pub mod policy;
pub mod review;

pub use mastery::{MasteryLevel, MasteryState};
pub use policy::{DeckLearningPolicy, PolicyUpdate};
pub use review::{Outcome, ReviewEvent, StudyMode};
