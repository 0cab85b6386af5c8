//! Style sheet scanning, symbolic value resolution and contrast math.

pub mod color;
pub mod contrast;
pub mod expr;
pub mod resolver;
pub mod scan;
pub mod symbols;

pub use color::{Hsl, Rgba};
pub use contrast::{contrast_ratio, relative_luminance, ContrastReport};
pub use resolver::{ResolveError, StyleResolver, Value, MAX_RESOLUTION_DEPTH};
pub use scan::{Declaration, StyleBlock, StyleSheet};
pub use symbols::{Binding, SymbolTable};
