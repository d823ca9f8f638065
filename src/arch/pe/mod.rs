pub mod devs;
pub mod main;
pub mod params;
pub mod pipeline;
pub mod processing_element;
pub mod signals;
pub mod state;

pub use main::create_simulation;
pub use params::PeParams;
pub use processing_element::ProcessingElement;
pub use signals::{Hazard, PeInput, PeOutput, RegAddr};
pub use state::PeState;
