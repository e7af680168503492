pub mod dominance;
pub mod error;
pub mod semantizer;
pub mod traits;

// Re-export commonly used types
pub use dominance::{verify_dominance, DominanceTree};
pub use error::SemantizerError;
pub use semantizer::Semantizer;
pub use traits::{
    AttrKind, HasAttributes, HasInwards, HasInwardsOfType, HasNthAttrOfKind, HasOperands,
    HasOperandsOfType, HasResultOfType, HasResults, Rule, SemantizerContext, TraitVerifier,
};
