use crate::error::{HeredityError, Result};
use crate::{Family, PersonRecord};
use log::{debug, warn};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// What to do with a trait cell that is not "1", "0" or blank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraitPolicy {
    /// Reject the roster.
    #[default]
    Strict,
    /// Treat the person's trait as unobserved.
    Lenient,
}

#[derive(Debug, Deserialize)]
struct Row {
    name: String,
    mother: String,
    father: String,
    #[serde(rename = "trait")]
    trait_: String,
}

fn blank_to_none(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_owned())
    }
}

/// Interprets a trait cell under `policy`.
pub fn parse_trait(person: &str, value: &str, policy: TraitPolicy) -> Result<Option<bool>> {
    match value.trim() {
        "1" => Ok(Some(true)),
        "0" => Ok(Some(false)),
        "" => Ok(None),
        other => match policy {
            TraitPolicy::Strict => Err(HeredityError::InvalidTrait {
                person: person.into(),
                value: other.into(),
            }),
            TraitPolicy::Lenient => {
                warn!(
                    "treating trait value '{}' for '{}' as unobserved",
                    other, person
                );
                Ok(None)
            }
        },
    }
}

/// Reads a family roster from delimited text.
///
/// The input must have a header with `name`, `mother`, `father` and `trait`
/// columns; any other columns are ignored.
pub struct RosterBuilder {
    delimiter: u8,
    trait_policy: TraitPolicy,
}

impl Default for RosterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterBuilder {
    /// Construct a new roster builder
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            trait_policy: TraitPolicy::default(),
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn trait_policy(&mut self, trait_policy: TraitPolicy) -> &mut Self {
        self.trait_policy = trait_policy;
        self
    }

    pub fn from_reader(&self, reader: Box<dyn Read>) -> Result<Family> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = vec![];
        for row in rdr.deserialize() {
            let row: Row = row?;
            let trait_ = parse_trait(&row.name, &row.trait_, self.trait_policy)?;
            records.push(PersonRecord {
                name: row.name,
                mother: blank_to_none(&row.mother),
                father: blank_to_none(&row.father),
                trait_,
            });
        }
        debug!("read {} roster records", records.len());

        Family::from_records(records)
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Family> {
        let file = File::open(path)?;
        self.from_reader(Box::new(file))
    }
}
