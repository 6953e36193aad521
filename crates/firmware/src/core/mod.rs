//! Firmware core infrastructure
//!
//! Logging macros and the trait layer between the tasks and the platform,
//! plus re-exports of the pure logic in `mdp_car_core` so firmware code can
//! reach it as `crate::core::X`.

pub mod logging;
pub mod traits;

pub use mdp_car_core::command;
pub use mdp_car_core::config;
pub use mdp_car_core::control;
pub use mdp_car_core::estimation;
pub use mdp_car_core::sensors;
