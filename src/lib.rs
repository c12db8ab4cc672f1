#![crate_name = "heredity"]
//! Exact inference over a family tree for a single inherited trait.
//!
//! Every person carries 0, 1 or 2 copies of a gene variant and either shows
//! the trait or not. Given the family structure and whatever trait
//! observations are known, [`Inference::infer`](crate::inference::Inference)
//! enumerates every consistent hypothesis and returns the exact posterior
//! marginals for each person.
use std::collections::BTreeMap;
use std::fmt;

pub mod prelude;

pub mod cpt;
pub mod enumerate;
pub mod error;
pub mod inference;
pub mod joint;
pub mod marginals;
pub mod report;
pub mod roster;

use crate::error::{HeredityError, Result};

/// Largest family the enumerator accepts. Hypotheses are packed into `u32`
/// masks and the work grows as 6^n long before this bound matters.
pub const MAX_FAMILY_SIZE: usize = 16;

pub type PersonIndex = usize;
pub type Names = BTreeMap<String, PersonIndex>;

/// Number of copies of the gene variant a person carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GeneCount {
    Zero,
    One,
    Two,
}

impl GeneCount {
    pub const ALL: [GeneCount; 3] = [GeneCount::Zero, GeneCount::One, GeneCount::Two];

    pub fn copies(self) -> u8 {
        match self {
            GeneCount::Zero => 0,
            GeneCount::One => 1,
            GeneCount::Two => 2,
        }
    }

    /// Position of this count in per-count tables.
    pub fn index(self) -> usize {
        self.copies() as usize
    }

    /// Probability that a parent with this many copies passes the variant on,
    /// before mutation.
    pub fn dosage(self) -> f64 {
        f64::from(self.copies()) / 2.0
    }
}

impl TryFrom<u8> for GeneCount {
    type Error = HeredityError;

    fn try_from(copies: u8) -> Result<Self> {
        match copies {
            0 => Ok(GeneCount::Zero),
            1 => Ok(GeneCount::One),
            2 => Ok(GeneCount::Two),
            n => Err(HeredityError::Roster(format!("{} is not a valid gene count", n))),
        }
    }
}

impl fmt::Display for GeneCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.copies())
    }
}

/// One unresolved roster row, as produced by a loader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonRecord {
    pub name: String,
    pub mother: Option<String>,
    pub father: Option<String>,
    pub trait_: Option<bool>,
}

impl PersonRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            mother: None,
            father: None,
            trait_: None,
        }
    }

    pub fn parents(mut self, mother: &str, father: &str) -> Self {
        self.mother = Some(mother.into());
        self.father = Some(father.into());
        self
    }

    pub fn observed(mut self, has_trait: bool) -> Self {
        self.trait_ = Some(has_trait);
        self
    }
}

/// A member of a `Family` with parent links resolved to indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    name: String,
    parents: Option<(PersonIndex, PersonIndex)>,
    observed: Option<bool>,
}

impl Person {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `(mother, father)` if both are recorded.
    pub fn parents(&self) -> Option<(PersonIndex, PersonIndex)> {
        self.parents
    }

    /// The known trait status, if it was observed.
    pub fn observed(&self) -> Option<bool> {
        self.observed
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn visit_ancestors(
    idx: PersonIndex,
    people: &[Person],
    marks: &mut [Mark],
) -> Option<PersonIndex> {
    match marks[idx] {
        Mark::Done => return None,
        Mark::InProgress => return Some(idx),
        Mark::Unvisited => {}
    }
    marks[idx] = Mark::InProgress;
    if let Some((mother, father)) = people[idx].parents {
        for parent in [mother, father].iter() {
            if let Some(cycle) = visit_ancestors(*parent, people, marks) {
                return Some(cycle);
            }
        }
    }
    marks[idx] = Mark::Done;
    None
}

/// A person who is their own ancestor, if the parent links contain a cycle.
fn find_ancestry_cycle(people: &[Person]) -> Option<PersonIndex> {
    let mut marks = vec![Mark::Unvisited; people.len()];
    (0..people.len()).find_map(|idx| visit_ancestors(idx, people, &mut marks))
}

/// Immutable family structure plus trait evidence.
#[derive(Clone, Debug)]
pub struct Family {
    people: Vec<Person>,
    names: Names,
}

impl Family {
    /// Builds a `Family` from roster records.
    ///
    /// Parents may be listed after their children. Every parent name must
    /// resolve to a record and each person has either both parents or none.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = PersonRecord>,
    {
        let records: Vec<PersonRecord> = records.into_iter().collect();
        if records.len() > MAX_FAMILY_SIZE {
            return Err(HeredityError::FamilyTooLarge {
                size: records.len(),
                max: MAX_FAMILY_SIZE,
            });
        }

        let mut names = Names::new();
        for (idx, record) in records.iter().enumerate() {
            if record.name.trim().is_empty() {
                return Err(HeredityError::Roster(format!("record {} has an empty name", idx)));
            }
            if names.insert(record.name.clone(), idx).is_some() {
                return Err(HeredityError::DuplicatePerson(record.name.clone()));
            }
        }

        let resolve = |person: &str, parent: &str| -> Result<PersonIndex> {
            if person == parent {
                return Err(HeredityError::Roster(format!(
                    "person '{}' is listed as their own parent",
                    person
                )));
            }
            names
                .get(parent)
                .copied()
                .ok_or_else(|| HeredityError::UnknownParent {
                    person: person.into(),
                    parent: parent.into(),
                })
        };

        let mut people = Vec::with_capacity(records.len());
        for record in &records {
            let parents = match (&record.mother, &record.father) {
                (None, None) => None,
                (Some(mother), Some(father)) => Some((
                    resolve(&record.name, mother)?,
                    resolve(&record.name, father)?,
                )),
                _ => return Err(HeredityError::SingleParent(record.name.clone())),
            };
            people.push(Person {
                name: record.name.clone(),
                parents,
                observed: record.trait_,
            });
        }

        if let Some(idx) = find_ancestry_cycle(&people) {
            return Err(HeredityError::Roster(format!(
                "ancestry cycle through '{}'",
                people[idx].name
            )));
        }

        Ok(Self { people, names })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// People in roster order.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn person(&self, idx: PersonIndex) -> Option<&Person> {
        self.people.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<PersonIndex> {
        self.names.get(name).copied()
    }

    /// Names in roster order.
    pub fn names(&self) -> Vec<&str> {
        self.people.iter().map(|p| p.name()).collect()
    }

    /// Number of people whose trait is known.
    pub fn observed_count(&self) -> usize {
        self.people.iter().filter(|p| p.observed.is_some()).count()
    }
}
