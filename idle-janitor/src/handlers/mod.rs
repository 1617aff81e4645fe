mod app;
mod check;

pub use app::app;
