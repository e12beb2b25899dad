//! Receipt normalization, field extraction and categorization.

mod categorizer;
mod fallback;
mod normalizer;
pub mod prompt;
pub mod rules;

pub use categorizer::{Categorization, HybridCategorizer};
pub use fallback::{NO_KEYWORDS_REASONING, RuleBasedCategorizer};
pub use normalizer::{Normalizer, clean_text};
