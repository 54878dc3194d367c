//! Query engines

mod list;
mod router;
mod synth;
mod transform;
mod vector;

pub use list::ListQueryEngine;
pub use router::RouterQueryEngine;
pub use synth::AnswerSynthesizer;
pub use transform::HydeTransform;
pub use vector::VectorQueryEngine;
