pub mod walker;

pub use walker::{read_text, SourceWalker, WalkOutcome, WalkedFile};
