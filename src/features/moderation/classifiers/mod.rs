//! Classification stages: external classifier adapter, lexical fallback and
//! the roasting leniency engine.

mod external;
pub mod leniency;
pub mod lexical;

pub use external::{
    ClassifierAdapter, ClassifierVerdict, RawClassifierVerdict, VerdictFlags, VideoClassification,
};

#[cfg(test)]
pub(crate) use external::test_support;
