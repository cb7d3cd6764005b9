pub mod animation;
pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod headless;
pub mod host;
pub mod lifecycle;
pub mod registry;
pub mod router;
pub mod script;
pub mod timer;

pub use config::AppConfig;
pub use engine::{EngineEvent, EngineState, Lifecycle, SnapEngine};
pub use error::{Error, Result};
pub use lifecycle::ResponsiveController;
pub use router::{Disposition, InputEvent};
