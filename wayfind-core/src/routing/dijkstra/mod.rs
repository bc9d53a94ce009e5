mod path_search;
mod state;

pub use path_search::{SearchPath, find_path, find_path_to_any};
