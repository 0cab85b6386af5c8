//! Scanning helpers shared by the engine and check implementations.

pub mod allowance;
pub mod lines;
pub mod markup;

#[doc(inline)]
pub use allowance::{check_allow_with_reason, AllowCheck};
#[doc(inline)]
pub use lines::LineIndex;
#[doc(inline)]
pub use markup::{Attribute, Element};
