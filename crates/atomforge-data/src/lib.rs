pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Solution, load_solution};
