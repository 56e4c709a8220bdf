pub mod libs;

pub use crate::libs::error::{BindError, Result};
pub use crate::libs::io::*;
