//! Implementations of `UpdateConfirmation` that talk to a terminal

mod interactive;

pub use interactive::InteractiveConfirmation;
