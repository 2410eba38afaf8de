//! A convenience prelude for all the serde stuff we're doing.

pub use enumset::*;
pub use serde::{Serialize, Deserialize};
pub use serde::de::{Deserializer, Error as DeError};
pub use serde::ser::Serializer;
pub use serde_json;
pub use strum_macros::*;
