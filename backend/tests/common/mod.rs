// Not every utils is used in every test, so we allow dead code
#![allow(unused_imports, dead_code)]

mod test_setup;
pub use test_setup::*;
mod mock_engines;
pub use mock_engines::*;
mod mock_provider;
pub use mock_provider::*;
mod utils;
pub use utils::*;
