pub mod console;
pub mod json;

pub use console::{render_line, Console, ConsoleLine};
pub use json::{read_results, to_json, write_results};
