pub mod config;
pub mod sim;
pub mod simulator;
pub mod stimulus;
pub mod utils;

// provide to pesim
pub use self::simulator::Simulator;
pub use self::utils::log;
