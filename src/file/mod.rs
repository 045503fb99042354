pub mod operations;

pub use operations::{load_file, LoadedFile};
