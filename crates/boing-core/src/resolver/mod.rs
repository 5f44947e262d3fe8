//! Overload resolution and invocation
//!
//! [`OverloadResolver`] ranks candidates against the runtime types of the
//! supplied arguments. [`Invoker`] applies the chosen conversions and runs the
//! candidate's handle.

mod invoker;
mod overload;

pub use invoker::{Args, Invoker};
pub use overload::{Conversion, OverloadResolver, Resolution};
