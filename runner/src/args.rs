mod codec;
mod value;


pub use codec::{encode, format_float, ArgumentSequence, EncodeError};
pub use value::{ConfigMap, ConfigValue};
