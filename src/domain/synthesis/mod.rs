//! Answer synthesis collaborator contract and fallback rendering

mod fallback;
mod provider;

pub use fallback::render_fallback;
pub use provider::{AnswerSource, AnswerStream, AnswerSynthesizer};

#[cfg(test)]
pub use provider::mock::MockAnswerSynthesizer;
