//! Property-based tests for inference invariants.

use heredity::prelude::*;
use proptest::prelude::*;
use proptest::sample::Index;

const EPSILON: f64 = 1e-9;

/// Families of up to five people. People from the third onwards may have
/// two distinct earlier people as parents.
fn family_strategy() -> impl Strategy<Value = Family> {
    prop::collection::vec(
        (
            any::<Option<bool>>(),
            any::<bool>(),
            any::<Index>(),
            any::<Index>(),
        ),
        1..=5,
    )
    .prop_map(|specs| {
        let records: Vec<PersonRecord> = specs
            .iter()
            .enumerate()
            .map(|(i, (observed, has_parents, mother, father))| {
                let mut record = PersonRecord::new(&format!("p{}", i));
                if i >= 2 && *has_parents {
                    let mother = mother.index(i);
                    let mut father = father.index(i);
                    if father == mother {
                        father = (mother + 1) % i;
                    }
                    record = record.parents(&format!("p{}", mother), &format!("p{}", father));
                }
                record.trait_ = *observed;
                record
            })
            .collect();
        Family::from_records(records).expect("generated family is valid")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn marginals_sum_to_one(family in family_strategy(), rate in 0.0f64..=1.0) {
        let cpt = Cpt::default().with_mutation_rate(rate).expect("rate in range");
        let marginals = family.infer(&cpt).expect("inference succeeds");
        prop_assert_eq!(marginals.len(), family.len());
        for person in marginals.iter() {
            let gene: f64 = person.gene.iter().sum();
            let traits: f64 = person.traits.iter().sum();
            prop_assert!((gene - 1.0).abs() < EPSILON, "{} gene sums to {}", person.name, gene);
            prop_assert!((traits - 1.0).abs() < EPSILON, "{} trait sums to {}", person.name, traits);
        }
    }

    #[test]
    fn hypotheses_respect_evidence(family in family_strategy()) {
        let space = HypothesisSpace::new(&family);
        let mut seen = 0u64;
        for hypothesis in space.iter() {
            seen += 1;
            for (idx, person) in family.people().iter().enumerate() {
                if let Some(observed) = person.observed() {
                    prop_assert_eq!(hypothesis.has_trait(idx), observed);
                }
            }
        }
        prop_assert_eq!(seen, space.hypothesis_count());
    }

    #[test]
    fn observed_traits_are_certain(family in family_strategy()) {
        let marginals = family.infer(&Cpt::default()).expect("inference succeeds");
        for (idx, person) in family.people().iter().enumerate() {
            if let Some(observed) = person.observed() {
                let posterior = marginals.person(idx).expect("person present");
                prop_assert!((posterior.trait_probability(observed) - 1.0).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn inference_is_repeatable_and_parallel_agrees(family in family_strategy()) {
        let cpt = Cpt::default();
        let first = family.infer(&cpt).expect("first run");
        let second = family.infer(&cpt).expect("second run");
        let parallel = family
            .infer_with(&cpt, &InferenceOptions::new().parallel(true))
            .expect("parallel run");
        for ((a, b), c) in first.iter().zip(second.iter()).zip(parallel.iter()) {
            for i in 0..3 {
                prop_assert!((a.gene[i] - b.gene[i]).abs() < EPSILON);
                prop_assert!((a.gene[i] - c.gene[i]).abs() < EPSILON);
            }
            for i in 0..2 {
                prop_assert!((a.traits[i] - b.traits[i]).abs() < EPSILON);
                prop_assert!((a.traits[i] - c.traits[i]).abs() < EPSILON);
            }
        }
    }
}
