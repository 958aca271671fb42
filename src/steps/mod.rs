//! Step model: typed descriptors and the navigation cursor

pub mod descriptor;
pub mod sequencer;

pub use descriptor::StepDescriptor;
pub use sequencer::StepSequencer;
