//! Enumeration of gene and trait hypotheses.
//!
//! People are addressed by their roster index and sets of people are `u32`
//! bitmasks, so a hypothesis is three masks and every sequence here is a
//! plain, restartable iterator.
use crate::{Family, GeneCount, PersonIndex};

/// Iterates every submask of `mask`, from `mask` itself down to the empty set.
#[derive(Clone, Debug)]
pub struct Submasks {
    mask: u32,
    next: Option<u32>,
}

impl Submasks {
    pub fn of(mask: u32) -> Self {
        Self {
            mask,
            next: Some(mask),
        }
    }
}

impl Iterator for Submasks {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.next?;
        self.next = if current == 0 {
            None
        } else {
            Some((current - 1) & self.mask)
        };
        Some(current)
    }
}

/// A complete assignment of gene count and trait status to every person.
///
/// Anyone in neither `one_gene` nor `two_genes` carries zero copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hypothesis {
    one_gene: u32,
    two_genes: u32,
    have_trait: u32,
}

impl Hypothesis {
    pub fn new(one_gene: u32, two_genes: u32, have_trait: u32) -> Self {
        debug_assert_eq!(one_gene & two_genes, 0, "gene sets must be disjoint");
        Self {
            one_gene,
            two_genes,
            have_trait,
        }
    }

    /// How many copies `person` carries under this hypothesis.
    pub fn gene_count(&self, person: PersonIndex) -> GeneCount {
        let bit = 1u32 << person;
        if self.two_genes & bit != 0 {
            GeneCount::Two
        } else if self.one_gene & bit != 0 {
            GeneCount::One
        } else {
            GeneCount::Zero
        }
    }

    pub fn has_trait(&self, person: PersonIndex) -> bool {
        self.have_trait & (1u32 << person) != 0
    }
}

/// The set of hypotheses consistent with a family's trait evidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HypothesisSpace {
    size: u32,
    people: u32,
    known: u32,
    observed_true: u32,
}

impl HypothesisSpace {
    pub fn new(family: &Family) -> Self {
        let mut known = 0;
        let mut observed_true = 0;
        for (idx, person) in family.people().iter().enumerate() {
            if let Some(has_trait) = person.observed() {
                known |= 1u32 << idx;
                if has_trait {
                    observed_true |= 1u32 << idx;
                }
            }
        }
        let size = family.len() as u32;
        Self {
            size,
            people: if size == 0 { 0 } else { u32::MAX >> (32 - size) },
            known,
            observed_true,
        }
    }

    /// Whether `have_trait` agrees with every observed trait.
    pub fn consistent(&self, have_trait: u32) -> bool {
        (have_trait ^ self.observed_true) & self.known == 0
    }

    /// Every subset of people that could be the "has trait" set.
    pub fn trait_sets(&self) -> impl Iterator<Item = u32> + Clone {
        let space = *self;
        Submasks::of(self.people).filter(move |have_trait| space.consistent(*have_trait))
    }

    /// Every `(one_gene, two_genes)` pair of disjoint subsets.
    pub fn gene_partitions(&self) -> impl Iterator<Item = (u32, u32)> + Clone {
        let people = self.people;
        Submasks::of(people)
            .flat_map(move |one| Submasks::of(people & !one).map(move |two| (one, two)))
    }

    /// All hypotheses sharing one trait set.
    pub fn hypotheses_for(&self, have_trait: u32) -> impl Iterator<Item = Hypothesis> + Clone {
        self.gene_partitions()
            .map(move |(one, two)| Hypothesis::new(one, two, have_trait))
    }

    /// The full evidence-consistent hypothesis sequence.
    pub fn iter(&self) -> impl Iterator<Item = Hypothesis> + Clone {
        let space = *self;
        self.trait_sets()
            .flat_map(move |have_trait| space.hypotheses_for(have_trait))
    }

    /// 3^n gene partitions times 2^(unobserved) trait sets.
    pub fn hypothesis_count(&self) -> u64 {
        let unobserved = self.size - self.known.count_ones();
        3u64.pow(self.size) * 2u64.pow(unobserved)
    }
}
