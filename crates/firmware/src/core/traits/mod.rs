//! Platform-agnostic traits used by the firmware tasks.
//!
//! ```text
//!            ┌──────────────────────────────────────────┐
//!            │ TimeSource          SharedState<T>       │
//!            │ + now_ms()          + with(f)            │
//!            │ + now_us()          + with_mut(f)        │
//!            └──────────────────────────────────────────┘
//!                     │                       │
//!          ┌──────────┴──────────┐  ┌─────────┴──────────┐
//!          │ EmbassyTime         │  │ EmbassyState<T>    │
//!          │ MockTime            │  │ MockState<T>       │
//!          └─────────────────────┘  └────────────────────┘
//! ```

pub mod sync;

pub use mdp_car_core::traits::{MockTime, TimeSource};
#[cfg(feature = "embassy")]
pub use sync::EmbassyState;
pub use sync::{MockState, SharedState};
