mod definition;
pub(crate) mod util;

pub use definition::{handle_definition, resolve_definitions};
