pub mod app;
pub use app::run;

pub mod cli;
pub mod config;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod utils;

// Process table access, matching, launch and termination
pub mod process;

// Platform abstraction layer
pub mod platform;

// Re-export platform-specific implementations through unified interface
pub mod os {
    pub mod kill {
        pub use crate::platform::current::kill::*;
    }
    pub mod launch {
        pub use crate::platform::current::launch::*;
    }
}
