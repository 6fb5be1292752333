//! Classification of stylesheet tags into style kinds.
//!
//! - [`StyleKind`]: the semantic categories
//! - [`ClassifierRegistry`]: ordered, last-match-wins handler table
//! - [`standard_registry`]: the built-in handlers

mod handlers;
mod kind;
mod registry;

pub use handlers::{standard_registry, ARROW_PEN, DASH_PEN};
pub use kind::StyleKind;
pub use registry::{
    Classification, ClassifierRegistry, ClassifyError, FragmentFn, FragmentRequest, Handler,
    TagMatcher,
};
