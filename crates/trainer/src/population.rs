//! Building the next generation: survival, mutation and breeding.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info};
use rand::Rng;

use evo_core::{Candidate, Generation, Lineage};

use crate::selector::select;
use crate::store::ModelStore;
use crate::TrainError;

/// Floor below which survival rate and temperature never decay.
pub const DECAY_FLOOR: f64 = 0.01;

/// Advances a scored generation to the next one.
///
/// Every candidate is archived to the model store first, so no generation
/// is lost even when its candidates don't survive.
pub struct PopulationManager<'a> {
    store: &'a dyn ModelStore,
}

impl<'a> PopulationManager<'a> {
    pub fn new(store: &'a dyn ModelStore) -> Self {
        Self { store }
    }

    /// Build the next generation:
    /// survivors are drawn score-weighted from the whole generation and
    /// carried unchanged; remaining slots are filled by mutating one
    /// survivor (probability `mutation_rate`) or breeding two distinct
    /// survivors, never reusing an unordered breeding pair within one
    /// generation. Survival rate and temperature decay afterwards.
    pub fn advance<R: Rng>(
        &self,
        mut generation: Generation,
        mutation_rate: f64,
        decay_rate: f64,
        target_size: usize,
        rng: &mut R,
    ) -> Result<Generation, TrainError> {
        generation.sort_by_score_desc();
        for candidate in &generation.candidates {
            self.store.put(generation.index, candidate)?;
        }

        let num_survivors = ((generation.survival_rate * target_size as f64).round() as usize)
            .max(1);
        // Survivor pool keeps the evaluated scores; selection over it stays
        // score-weighted.
        let survivors: Vec<Candidate> = select(&generation.candidates, num_survivors, rng)?
            .into_iter()
            .cloned()
            .collect();
        debug!(
            "generation {}: {} survivors of {}",
            generation.index,
            survivors.len(),
            generation.len()
        );

        let mut next: Vec<Candidate> = survivors.iter().map(Candidate::carried_forward).collect();

        let total_pairs = num_survivors * num_survivors.saturating_sub(1) / 2;
        let mut used_pairs: HashSet<(String, String)> = HashSet::new();

        while next.len() < target_size {
            // With a single survivor (or every unordered pair spent),
            // breeding cannot produce a fresh pairing: fall back to
            // mutation instead of redrawing forever.
            let must_mutate = num_survivors == 1 || used_pairs.len() >= total_pairs;

            if must_mutate || rng.gen::<f64>() < mutation_rate {
                next.push(self.mutate_child(&survivors, &next, generation.temperature, rng)?);
            } else {
                let parents = select(&survivors, 2, rng)?;
                let key = pair_key(&parents[0].name, &parents[1].name);
                if !used_pairs.insert(key) {
                    continue; // pair already bred this generation
                }
                let name = format!("{}-{}", parents[0].name, parents[1].name);
                if next.iter().any(|c| c.name == name) {
                    continue; // a surviving child of the same pair keeps the name
                }
                let model = parents[0].model.breed(parents[1].model.as_ref())?;
                next.push(Candidate::with_lineage(
                    name,
                    Arc::from(model),
                    Lineage::Breeding {
                        parents: [parents[0].name.clone(), parents[1].name.clone()],
                    },
                ));
            }
        }

        let survival_rate = (generation.survival_rate * (1.0 - decay_rate)).max(DECAY_FLOOR);
        let temperature = (generation.temperature * (1.0 - decay_rate)).max(DECAY_FLOOR);
        info!(
            "generation {} built: survival_rate {:.3}, temperature {:.3}",
            generation.index + 1,
            survival_rate,
            temperature
        );

        Ok(Generation {
            index: generation.index + 1,
            candidates: next,
            survival_rate,
            temperature,
        })
    }

    fn mutate_child<R: Rng>(
        &self,
        survivors: &[Candidate],
        next: &[Candidate],
        temperature: f64,
        rng: &mut R,
    ) -> Result<Candidate, TrainError> {
        let parent = select(survivors, 1, rng)?[0];

        let mut mutations = parent.mutation_count() + 1;
        let mut name = format!("{}.{}", parent.name, mutations);
        while next.iter().any(|c| c.name == name) {
            mutations += 1;
            name = format!("{}.{}", parent.name, mutations);
        }

        let model = parent.model.mutate(temperature, rng);
        Ok(Candidate::with_lineage(
            name,
            Arc::from(model),
            Lineage::Mutation {
                parent: parent.name.clone(),
                mutations,
            },
        ))
    }
}

/// Order-independent key for an unordered breeding pair.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
#[path = "population_tests.rs"]
mod population_tests;
