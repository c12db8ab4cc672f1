pub use crate::cpt::{Cpt, TraitTable};
pub use crate::enumerate::{Hypothesis, HypothesisSpace, Submasks};
pub use crate::error::HeredityError;
pub use crate::inference::{Inference, InferenceOptions};
pub use crate::joint::Network;
pub use crate::marginals::{Marginals, PersonMarginals, Tally};
pub use crate::roster::{RosterBuilder, TraitPolicy};
pub use crate::{Family, GeneCount, Person, PersonIndex, PersonRecord};
