//! Rendering of posterior marginals for people to read or tools to parse.
use crate::error::Result;
use crate::marginals::{Marginals, PersonMarginals};
use crate::GeneCount;
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct GeneJson {
    #[serde(rename = "0")]
    zero: f64,
    #[serde(rename = "1")]
    one: f64,
    #[serde(rename = "2")]
    two: f64,
}

#[derive(Serialize)]
struct TraitJson {
    #[serde(rename = "true")]
    present: f64,
    #[serde(rename = "false")]
    absent: f64,
}

#[derive(Serialize)]
struct PersonJson<'a> {
    name: &'a str,
    gene: GeneJson,
    #[serde(rename = "trait")]
    trait_: TraitJson,
}

impl<'a> From<&'a PersonMarginals> for PersonJson<'a> {
    fn from(person: &'a PersonMarginals) -> Self {
        Self {
            name: &person.name,
            gene: GeneJson {
                zero: person.gene(GeneCount::Zero),
                one: person.gene(GeneCount::One),
                two: person.gene(GeneCount::Two),
            },
            trait_: TraitJson {
                present: person.trait_probability(true),
                absent: person.trait_probability(false),
            },
        }
    }
}

/// Plain text layout: four decimals per probability, gene counts listed
/// from two copies down.
impl fmt::Display for Marginals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for person in self.iter() {
            writeln!(f, "{}:", person.name)?;
            writeln!(f, "  Gene:")?;
            for gene in GeneCount::ALL.iter().rev() {
                writeln!(f, "    {}: {:.4}", gene, person.gene(*gene))?;
            }
            writeln!(f, "  Trait:")?;
            for has_trait in [true, false].iter() {
                let label = if *has_trait { "True" } else { "False" };
                writeln!(f, "    {}: {:.4}", label, person.trait_probability(*has_trait))?;
            }
        }
        Ok(())
    }
}

pub fn render_text(marginals: &Marginals) -> String {
    marginals.to_string()
}

/// JSON array with one object per person in roster order.
pub fn render_json(marginals: &Marginals) -> Result<String> {
    let people: Vec<PersonMarginals> = marginals.iter().collect();
    let rows: Vec<PersonJson<'_>> = people.iter().map(PersonJson::from).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
