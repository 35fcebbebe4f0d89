//! Draft state machines and their shared artifacts.

pub mod bracket;
pub mod log;
pub mod traditional;
pub mod winston;

pub use bracket::Bracket;
pub use log::{DraftLog, DraftLogRecipients};
pub use traditional::TraditionalDraft;
pub use winston::WinstonDraft;

/// The session's current draft, if any. Sealed and Jumpstart are
/// single-shot distributions and never occupy this slot.
#[derive(Debug, Default)]
pub enum DraftState {
    #[default]
    None,
    Traditional(TraditionalDraft),
    Winston(WinstonDraft),
}

impl DraftState {
    /// Whether a draft is live: membership is frozen and disconnects are
    /// snapshotted instead of dropped.
    pub fn is_drafting(&self) -> bool {
        match self {
            Self::None => false,
            Self::Traditional(draft) => !draft.ended,
            Self::Winston(draft) => !draft.ended,
        }
    }
}
