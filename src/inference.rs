//! Exact posterior inference over a `Family`.
//!
//! Every evidence-consistent hypothesis is scored with the network's joint
//! probability and summed into a `Tally`, which is normalized at the end.
//! In parallel mode the trait sets are sharded across the rayon pool, each
//! worker folding into a private tally; partial tallies are merged only once
//! every worker has returned.
use crate::cpt::Cpt;
use crate::enumerate::HypothesisSpace;
use crate::error::{HeredityError, Result};
use crate::joint::Network;
use crate::marginals::{Marginals, Tally};
use crate::Family;
use log::{debug, info};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How an inference run is executed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InferenceOptions {
    pub parallel: bool,
    /// Abort with `DeadlineExceeded` once this much time has elapsed.
    pub deadline: Option<Duration>,
}

impl InferenceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

pub trait Inference {
    /// Sequential inference with no deadline.
    fn infer(&self, cpt: &Cpt) -> Result<Marginals> {
        self.infer_with(cpt, &InferenceOptions::default())
    }

    fn infer_with(&self, cpt: &Cpt, options: &InferenceOptions) -> Result<Marginals>;
}

impl Inference for Family {
    fn infer_with(&self, cpt: &Cpt, options: &InferenceOptions) -> Result<Marginals> {
        let started = Instant::now();
        let deadline = options.deadline.map(|d| started + d);
        let space = HypothesisSpace::new(self);
        let network = Network::new(self, cpt);
        debug!(
            "enumerating {} hypotheses for {} people ({} observed)",
            space.hypothesis_count(),
            self.len(),
            self.observed_count()
        );

        let tally = if options.parallel {
            accumulate_parallel(&network, &space, deadline)?
        } else {
            accumulate(&network, &space, deadline)?
        };
        let marginals = tally.normalize(self)?;

        info!(
            "inferred marginals for {} people in {:?}",
            self.len(),
            started.elapsed()
        );
        Ok(marginals)
    }
}

fn check_deadline(deadline: Option<Instant>, completed: u64) -> Result<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => {
            Err(HeredityError::DeadlineExceeded(completed))
        }
        _ => Ok(()),
    }
}

/// Gene partitions scored between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 4096;

/// Scores every gene partition for one trait set into `tally`.
///
/// A single trait set holds 3^n partitions, so the deadline is also checked
/// while it is being scored. `completed` is the number of finished trait sets
/// reported if the deadline passes.
fn accumulate_trait_set(
    network: &Network<'_>,
    space: &HypothesisSpace,
    have_trait: u32,
    tally: &mut Tally,
    deadline: Option<Instant>,
    completed: u64,
) -> Result<()> {
    for (scored, hypothesis) in space.hypotheses_for(have_trait).enumerate() {
        if scored % DEADLINE_CHECK_INTERVAL == 0 {
            check_deadline(deadline, completed)?;
        }
        let p = network.joint_probability(&hypothesis);
        tally.add(&hypothesis, p);
    }
    Ok(())
}

fn accumulate(
    network: &Network<'_>,
    space: &HypothesisSpace,
    deadline: Option<Instant>,
) -> Result<Tally> {
    let mut tally = Tally::new(network.family().len());
    for (completed, have_trait) in space.trait_sets().enumerate() {
        accumulate_trait_set(
            network,
            space,
            have_trait,
            &mut tally,
            deadline,
            completed as u64,
        )?;
    }
    Ok(tally)
}

fn accumulate_parallel(
    network: &Network<'_>,
    space: &HypothesisSpace,
    deadline: Option<Instant>,
) -> Result<Tally> {
    let people = network.family().len();
    let trait_sets: Vec<u32> = space.trait_sets().collect();
    debug!(
        "sharding {} trait sets across {} threads",
        trait_sets.len(),
        rayon::current_num_threads()
    );

    let completed = AtomicU64::new(0);
    let partials = trait_sets
        .par_iter()
        .try_fold(
            || Tally::new(people),
            |mut tally, &have_trait| -> Result<Tally> {
                accumulate_trait_set(
                    network,
                    space,
                    have_trait,
                    &mut tally,
                    deadline,
                    completed.load(Ordering::Relaxed),
                )?;
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(tally)
            },
        )
        .collect::<Result<Vec<Tally>>>()?;

    // All shards have finished; only now is mass combined.
    let mut tally = Tally::new(people);
    for partial in &partials {
        tally.merge(partial);
    }
    debug!("merged {} partial tallies", partials.len());
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpt::TraitTable;
    use crate::{GeneCount, PersonRecord};
    use std::error::Error;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} got {}",
            expected,
            actual
        );
    }

    fn potters() -> Result<Family> {
        Family::from_records(vec![
            PersonRecord::new("Harry").parents("Lily", "James"),
            PersonRecord::new("James").observed(true),
            PersonRecord::new("Lily").observed(false),
        ])
    }

    #[test]
    fn test_potter_family_posteriors() -> std::result::Result<(), Box<dyn Error>> {
        let marginals = potters()?.infer(&Cpt::default())?;

        let harry = marginals.get("Harry").ok_or("missing Harry")?;
        assert_close(harry.gene(GeneCount::Two), 0.009183, 1e-6);
        assert_close(harry.gene(GeneCount::One), 0.455698, 1e-6);
        assert_close(harry.gene(GeneCount::Zero), 0.535119, 1e-6);
        assert_close(harry.trait_probability(true), 0.266511, 1e-6);

        let james = marginals.get("James").ok_or("missing James")?;
        assert_close(james.gene(GeneCount::Two), 0.197568, 1e-6);
        assert_close(james.gene(GeneCount::One), 0.510638, 1e-6);
        assert_close(james.trait_probability(true), 1.0, EPSILON);

        let lily = marginals.get("Lily").ok_or("missing Lily")?;
        assert_close(lily.gene(GeneCount::Zero), 0.982732, 1e-6);
        assert_close(lily.trait_probability(false), 1.0, EPSILON);
        Ok(())
    }

    #[test]
    fn test_unobserved_founder_recovers_priors() -> std::result::Result<(), Box<dyn Error>> {
        let family = Family::from_records(vec![PersonRecord::new("Solo")])?;
        let solo = family.infer(&Cpt::default())?.person(0).ok_or("missing Solo")?;
        assert_close(solo.gene(GeneCount::Zero), 0.96, EPSILON);
        assert_close(solo.gene(GeneCount::One), 0.03, EPSILON);
        assert_close(solo.gene(GeneCount::Two), 0.01, EPSILON);
        assert_close(solo.trait_probability(true), 0.0329, EPSILON);
        assert_close(solo.trait_probability(false), 0.9671, EPSILON);
        Ok(())
    }

    #[test]
    fn test_no_mutation_from_non_carriers() -> std::result::Result<(), Box<dyn Error>> {
        let tables = [
            TraitTable::new(0.01, 0.99),
            TraitTable::new(0.56, 0.44),
            TraitTable::new(0.65, 0.35),
        ];
        // Founders certainly carry no copies and nothing mutates.
        let cpt = Cpt::new([1.0, 0.0, 0.0], tables, 0.0)?;

        let child = potters()?.infer(&cpt)?.get("Harry").ok_or("missing Harry")?;
        assert_close(child.gene(GeneCount::Zero), 1.0, EPSILON);
        assert_close(child.gene(GeneCount::One), 0.0, EPSILON);
        assert_close(child.gene(GeneCount::Two), 0.0, EPSILON);
        Ok(())
    }

    #[test]
    fn test_half_mutation_erases_parentage() -> std::result::Result<(), Box<dyn Error>> {
        let cpt = Cpt::default().with_mutation_rate(0.5)?;
        let child = potters()?.infer(&cpt)?.get("Harry").ok_or("missing Harry")?;
        assert_close(child.gene(GeneCount::Zero), 0.25, EPSILON);
        assert_close(child.gene(GeneCount::One), 0.5, EPSILON);
        assert_close(child.gene(GeneCount::Two), 0.25, EPSILON);
        Ok(())
    }

    #[test]
    fn test_parallel_matches_sequential() -> std::result::Result<(), Box<dyn Error>> {
        let family = potters()?;
        let cpt = Cpt::default();
        let sequential = family.infer(&cpt)?;
        let parallel = family.infer_with(&cpt, &InferenceOptions::new().parallel(true))?;
        for (a, b) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(a.name, b.name);
            for (x, y) in a.gene.iter().zip(b.gene.iter()) {
                assert_close(*x, *y, EPSILON);
            }
            for (x, y) in a.traits.iter().zip(b.traits.iter()) {
                assert_close(*x, *y, EPSILON);
            }
        }
        Ok(())
    }

    #[test]
    fn test_expired_deadline_aborts() -> Result<()> {
        let options = InferenceOptions::new().deadline(Duration::from_secs(0));
        let family = potters()?;
        assert!(matches!(
            family.infer_with(&Cpt::default(), &options),
            Err(HeredityError::DeadlineExceeded(0))
        ));
        assert!(matches!(
            family.infer_with(&Cpt::default(), &options.parallel(true)),
            Err(HeredityError::DeadlineExceeded(_))
        ));
        Ok(())
    }

    #[test]
    fn test_deadline_interrupts_a_single_large_trait_set() -> Result<()> {
        // Fully observed, so the whole search is one trait set of 3^13 partitions.
        let family = Family::from_records(
            (0..13).map(|i| PersonRecord::new(&format!("p{}", i)).observed(i % 2 == 0)),
        )?;
        assert_eq!(HypothesisSpace::new(&family).trait_sets().count(), 1);

        let options = InferenceOptions::new().deadline(Duration::from_millis(1));
        assert!(matches!(
            family.infer_with(&Cpt::default(), &options),
            Err(HeredityError::DeadlineExceeded(0))
        ));
        assert!(matches!(
            family.infer_with(&Cpt::default(), &options.parallel(true)),
            Err(HeredityError::DeadlineExceeded(0))
        ));
        Ok(())
    }

    #[test]
    fn test_impossible_evidence_has_no_mass() -> Result<()> {
        let never = TraitTable::new(0.0, 1.0);
        let cpt = Cpt::new([0.96, 0.03, 0.01], [never, never, never], 0.01)?;
        assert!(matches!(
            potters()?.infer(&cpt),
            Err(HeredityError::ZeroMass { .. })
        ));
        Ok(())
    }
}
