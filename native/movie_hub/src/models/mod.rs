mod display;
pub use display::*;
pub mod language;
mod movie;
pub use movie::*;
mod settings;
pub use settings::*;
pub mod signals;
