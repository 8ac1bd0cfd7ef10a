//! Learning-rate scheduling and early stopping driven by dev-set scores.

pub mod early_stop;
pub mod plateau;

pub use early_stop::{LossDeltaStopper, DEFAULT_LOSS_TOLERANCE};
pub use plateau::{PlateauMode, ReduceLrOnPlateau};
