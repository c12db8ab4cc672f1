//! Joint probability of a hypothesis under the inheritance network.
//!
//! Each parent independently hands one allele to the child. The parent passes
//! the variant with probability `copies / 2`, and the allele then flips with
//! the mutation rate, so the child receives the variant from that parent with
//! probability
//!
//! ```text
//! r = t * (1 - m) + (1 - t) * m
//! ```
//!
//! The child's gene count is the sum of the two received alleles, giving
//! `[(1 - a)(1 - b), a(1 - b) + (1 - a)b, ab]` for 0, 1 and 2 copies.
use crate::cpt::Cpt;
use crate::enumerate::Hypothesis;
use crate::{Family, GeneCount, PersonIndex};

/// Probability that a child receives the variant allele from `parent`.
pub fn received_variant(parent: GeneCount, mutation_rate: f64) -> f64 {
    let transmit = parent.dosage();
    transmit * (1.0 - mutation_rate) + (1.0 - transmit) * mutation_rate
}

/// Distribution of a child's gene count given both parents' counts.
pub fn inheritance(mother: GeneCount, father: GeneCount, mutation_rate: f64) -> [f64; 3] {
    let a = received_variant(mother, mutation_rate);
    let b = received_variant(father, mutation_rate);
    [
        (1.0 - a) * (1.0 - b),
        a * (1.0 - b) + (1.0 - a) * b,
        a * b,
    ]
}

/// A family bound to its probability tables.
///
/// The 3x3 table of child distributions is computed once so scoring a
/// hypothesis is only lookups and multiplication.
pub struct Network<'a> {
    family: &'a Family,
    cpt: &'a Cpt,
    inheritance: [[[f64; 3]; 3]; 3],
}

impl<'a> Network<'a> {
    pub fn new(family: &'a Family, cpt: &'a Cpt) -> Self {
        let mut table = [[[0.0; 3]; 3]; 3];
        for mother in GeneCount::ALL.iter() {
            for father in GeneCount::ALL.iter() {
                table[mother.index()][father.index()] =
                    inheritance(*mother, *father, cpt.mutation_rate());
            }
        }
        Self {
            family,
            cpt,
            inheritance: table,
        }
    }

    pub fn family(&self) -> &Family {
        self.family
    }

    /// Probability of `gene` copies for a child of parents with the given counts.
    pub fn child_gene_probability(
        &self,
        mother: GeneCount,
        father: GeneCount,
        gene: GeneCount,
    ) -> f64 {
        self.inheritance[mother.index()][father.index()][gene.index()]
    }

    /// Local factor for one person: P(gene | parents) * P(trait | gene).
    pub fn person_probability(&self, hypothesis: &Hypothesis, person: PersonIndex) -> f64 {
        let gene = hypothesis.gene_count(person);
        let has_trait = hypothesis.has_trait(person);
        let parents = self.family.person(person).and_then(|p| p.parents());

        let gene_probability = match parents {
            None => self.cpt.gene_prior(gene),
            Some((mother, father)) => self.child_gene_probability(
                hypothesis.gene_count(mother),
                hypothesis.gene_count(father),
                gene,
            ),
        };
        gene_probability * self.cpt.trait_given_gene(gene, has_trait)
    }

    /// Probability that every person's gene count and trait match `hypothesis`.
    pub fn joint_probability(&self, hypothesis: &Hypothesis) -> f64 {
        (0..self.family.len())
            .map(|person| self.person_probability(hypothesis, person))
            .product()
    }
}
