mod readers;
mod util;

pub use readers::open_sites_reader;
pub use util::{create_writer, handle_error_and_exit, Result};
