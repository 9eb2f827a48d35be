mod money;
mod secret;

pub use money::{Paise, PaiseConversionError};
pub use secret::Secret;
