mod log;
mod plot;

pub use log::Logs;
pub use plot::Plots;
