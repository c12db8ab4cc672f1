//! Conditional probability tables for the inheritance network.
//!
//! A `Cpt` is built once, validated once and then shared by reference with
//! every stage of inference. Tables can be substituted from a JSON file with
//! the same field names as the struct.
use crate::error::{HeredityError, Result};
use crate::GeneCount;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Allowed deviation when checking that a distribution sums to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Bernoulli distribution of the trait for one gene count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitTable {
    pub present: f64,
    pub absent: f64,
}

impl TraitTable {
    pub fn new(present: f64, absent: f64) -> Self {
        Self { present, absent }
    }

    pub fn probability(&self, has_trait: bool) -> f64 {
        if has_trait {
            self.present
        } else {
            self.absent
        }
    }
}

/// Validated network parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CptConfig")]
pub struct Cpt {
    gene_prior: [f64; 3],
    trait_given_gene: [TraitTable; 3],
    mutation_rate: f64,
}

/// Unvalidated shape of a `Cpt` as read from configuration.
#[derive(Deserialize)]
struct CptConfig {
    gene_prior: [f64; 3],
    trait_given_gene: [TraitTable; 3],
    mutation_rate: f64,
}

impl TryFrom<CptConfig> for Cpt {
    type Error = HeredityError;

    fn try_from(config: CptConfig) -> Result<Self> {
        Cpt::new(config.gene_prior, config.trait_given_gene, config.mutation_rate)
    }
}

impl Default for Cpt {
    fn default() -> Self {
        Self {
            gene_prior: [0.96, 0.03, 0.01],
            trait_given_gene: [
                TraitTable::new(0.01, 0.99),
                TraitTable::new(0.56, 0.44),
                TraitTable::new(0.65, 0.35),
            ],
            mutation_rate: 0.01,
        }
    }
}

fn check_probability(what: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 || value > 1.0 {
        return Err(HeredityError::InvalidCpt(format!(
            "{} must be a probability in [0, 1], got {}",
            what, value
        )));
    }
    Ok(())
}

fn check_sums_to_one(what: &str, values: &[f64]) -> Result<()> {
    let total: f64 = values.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(HeredityError::InvalidCpt(format!(
            "{} must sum to 1, got {}",
            what, total
        )));
    }
    Ok(())
}

impl Cpt {
    /// Validates and constructs a table set.
    ///
    /// `gene_prior` and `trait_given_gene` are indexed by gene count.
    pub fn new(
        gene_prior: [f64; 3],
        trait_given_gene: [TraitTable; 3],
        mutation_rate: f64,
    ) -> Result<Self> {
        for gene in GeneCount::ALL.iter() {
            let idx = gene.index();
            check_probability(&format!("gene prior for {} copies", gene), gene_prior[idx])?;
            let table = &trait_given_gene[idx];
            check_probability(&format!("trait presence for {} copies", gene), table.present)?;
            check_probability(&format!("trait absence for {} copies", gene), table.absent)?;
            check_sums_to_one(
                &format!("trait table for {} copies", gene),
                &[table.present, table.absent],
            )?;
        }
        check_sums_to_one("gene prior", &gene_prior)?;
        check_probability("mutation rate", mutation_rate)?;

        Ok(Self {
            gene_prior,
            trait_given_gene,
            mutation_rate,
        })
    }

    /// Same tables with a different mutation rate.
    pub fn with_mutation_rate(&self, mutation_rate: f64) -> Result<Self> {
        Self::new(self.gene_prior, self.trait_given_gene, mutation_rate)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Unconditional probability of carrying `gene` copies.
    pub fn gene_prior(&self, gene: GeneCount) -> f64 {
        self.gene_prior[gene.index()]
    }

    pub fn trait_given_gene(&self, gene: GeneCount, has_trait: bool) -> f64 {
        self.trait_given_gene[gene.index()].probability(has_trait)
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_default_tables_validate() -> Result<()> {
        let cpt = Cpt::default();
        let rebuilt = Cpt::new(cpt.gene_prior, cpt.trait_given_gene, cpt.mutation_rate)?;
        assert_eq!(rebuilt, cpt);
        assert_eq!(cpt.gene_prior(GeneCount::Two), 0.01);
        assert_eq!(cpt.trait_given_gene(GeneCount::One, true), 0.56);
        Ok(())
    }

    #[test]
    fn test_prior_must_sum_to_one() {
        let cpt = Cpt::default();
        let err = Cpt::new([0.9, 0.03, 0.01], cpt.trait_given_gene, 0.01).unwrap_err();
        assert!(err.to_string().contains("gene prior must sum to 1"));
    }

    #[test]
    fn test_trait_table_must_sum_to_one() {
        let cpt = Cpt::default();
        let mut tables = cpt.trait_given_gene;
        tables[1] = TraitTable::new(0.56, 0.45);
        assert!(matches!(
            Cpt::new(cpt.gene_prior, tables, 0.01),
            Err(HeredityError::InvalidCpt(_))
        ));
    }

    #[test]
    fn test_mutation_rate_bounds() {
        let cpt = Cpt::default();
        assert!(cpt.with_mutation_rate(-0.1).is_err());
        assert!(cpt.with_mutation_rate(1.5).is_err());
        assert!(cpt.with_mutation_rate(f64::NAN).is_err());
        assert!(cpt.with_mutation_rate(0.0).is_ok());
        assert!(cpt.with_mutation_rate(1.0).is_ok());
    }

    #[test]
    fn test_json_round_trip_revalidates() -> std::result::Result<(), Box<dyn Error>> {
        let json = serde_json::to_string(&Cpt::default())?;
        assert_eq!(Cpt::from_json_reader(json.as_bytes())?, Cpt::default());

        let bad = r#"{
            "gene_prior": [0.5, 0.5, 0.5],
            "trait_given_gene": [
                {"present": 0.01, "absent": 0.99},
                {"present": 0.56, "absent": 0.44},
                {"present": 0.65, "absent": 0.35}
            ],
            "mutation_rate": 0.01
        }"#;
        assert!(Cpt::from_json_reader(bad.as_bytes()).is_err());
        Ok(())
    }
}
