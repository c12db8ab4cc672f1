//! Accumulation and normalization of per-person marginals.
use crate::enumerate::Hypothesis;
use crate::error::{HeredityError, Result};
use crate::{Family, GeneCount, PersonIndex};
use ndarray::{Array2, Axis};

/// Column of a trait value in trait tables.
fn trait_column(has_trait: bool) -> usize {
    if has_trait {
        1
    } else {
        0
    }
}

/// Unnormalized probability mass per person.
///
/// Rows are people in roster order. `gene` has one column per gene count,
/// `traits` has columns `[absent, present]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tally {
    gene: Array2<f64>,
    traits: Array2<f64>,
}

impl Tally {
    pub fn new(people: usize) -> Self {
        Self {
            gene: Array2::zeros((people, 3)),
            traits: Array2::zeros((people, 2)),
        }
    }

    pub fn people(&self) -> usize {
        self.gene.len_of(Axis(0))
    }

    /// Adds `p` to every person's assigned gene count and trait value.
    pub fn add(&mut self, hypothesis: &Hypothesis, p: f64) {
        for person in 0..self.people() {
            self.gene[[person, hypothesis.gene_count(person).index()]] += p;
            self.traits[[person, trait_column(hypothesis.has_trait(person))]] += p;
        }
    }

    /// Elementwise sum of another partial tally into this one.
    pub fn merge(&mut self, other: &Tally) {
        self.gene += &other.gene;
        self.traits += &other.traits;
    }

    pub fn gene_mass(&self, person: PersonIndex, gene: GeneCount) -> f64 {
        self.gene[[person, gene.index()]]
    }

    pub fn trait_mass(&self, person: PersonIndex, has_trait: bool) -> f64 {
        self.traits[[person, trait_column(has_trait)]]
    }

    /// Rescales each person's gene and trait rows to sum to one.
    pub fn normalize(mut self, family: &Family) -> Result<Marginals> {
        normalize_rows(&mut self.gene, family, "gene")?;
        normalize_rows(&mut self.traits, family, "trait")?;
        Ok(Marginals {
            names: family.names().into_iter().map(String::from).collect(),
            gene: self.gene,
            traits: self.traits,
        })
    }
}

fn normalize_rows(table: &mut Array2<f64>, family: &Family, field: &'static str) -> Result<()> {
    for (person, mut row) in table.genrows_mut().into_iter().enumerate() {
        let total = row.sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(HeredityError::ZeroMass {
                person: family
                    .person(person)
                    .map(|p| p.name().to_string())
                    .unwrap_or_else(|| person.to_string()),
                field,
            });
        }
        row.mapv_inplace(|x| x / total);
    }
    Ok(())
}

/// One person's posterior distributions.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonMarginals {
    pub name: String,
    /// Indexed by gene count.
    pub gene: [f64; 3],
    /// `[absent, present]`.
    pub traits: [f64; 2],
}

impl PersonMarginals {
    pub fn gene(&self, gene: GeneCount) -> f64 {
        self.gene[gene.index()]
    }

    pub fn trait_probability(&self, has_trait: bool) -> f64 {
        self.traits[trait_column(has_trait)]
    }
}

/// Normalized posterior marginals for a whole family.
#[derive(Clone, Debug, PartialEq)]
pub struct Marginals {
    names: Vec<String>,
    gene: Array2<f64>,
    traits: Array2<f64>,
}

impl Marginals {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn person(&self, idx: PersonIndex) -> Option<PersonMarginals> {
        let name = self.names.get(idx)?;
        Some(PersonMarginals {
            name: name.clone(),
            gene: [
                self.gene[[idx, 0]],
                self.gene[[idx, 1]],
                self.gene[[idx, 2]],
            ],
            traits: [self.traits[[idx, 0]], self.traits[[idx, 1]]],
        })
    }

    pub fn get(&self, name: &str) -> Option<PersonMarginals> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.person(idx)
    }

    /// People in roster order.
    pub fn iter(&self) -> impl Iterator<Item = PersonMarginals> + '_ {
        (0..self.len()).filter_map(move |idx| self.person(idx))
    }
}
