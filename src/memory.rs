use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, trace};

use crate::known_object::KnownObject;
use crate::observation::Observation;

/// Working memory of tracked objects. One `make_observations` call per
/// incoming frame: matches observations to known objects, promotes
/// sufficiently certain leftovers to new objects and forgets stale history.
///
/// Not internally synchronised; a tracking cycle must run under an external
/// exclusive lock, and cycles must be applied in timestamp order.
#[derive(Debug)]
pub struct Memory {
    known_objects: Vec<KnownObject>,
    id_counter: u64,
    initial_certainty_threshold: f32,
    remember_duration: Duration,
}

impl Memory {
    pub fn new(initial_certainty_threshold: f32, remember_duration: Duration) -> Self {
        Self {
            known_objects: Vec::new(),
            id_counter: 0,
            initial_certainty_threshold,
            remember_duration,
        }
    }

    #[inline]
    pub fn initial_certainty_threshold(&self) -> f32 {
        self.initial_certainty_threshold
    }

    #[inline]
    pub fn set_initial_certainty_threshold(&mut self, value: f32) {
        self.initial_certainty_threshold = value;
    }

    #[inline]
    pub fn remember_duration(&self) -> Duration {
        self.remember_duration
    }

    #[inline]
    pub fn set_remember_duration(&mut self, value: Duration) {
        self.remember_duration = value;
    }

    /// Runs one update cycle. `now` is in microseconds; pass `None` to use
    /// the wall clock, or an explicit timestamp for deterministic replay.
    pub fn make_observations(&mut self, observations: Vec<Observation>, now: Option<i64>) {
        let mut observations = observations;

        self.match_observations_to_known_objects(&mut observations);

        // Promote the remaining observations to new objects if their primary
        // candidate is certain enough; discard the rest.
        for observation in observations {
            let certainty = observation.primary_candidate().certainty;
            if certainty >= self.initial_certainty_threshold {
                self.id_counter += 1;
                let known_object = KnownObject::new(observation, self.id_counter);
                debug!(
                    "new object {} (certainty {:.2})",
                    known_object.id(),
                    certainty
                );
                self.known_objects.push(known_object);
            } else {
                trace!("discarding observation below certainty threshold ({certainty:.2})");
            }
        }

        // Forget outdated observations, evict emptied objects.
        let now = now.unwrap_or_else(wall_clock_us);
        let remember_duration = self.remember_duration;
        self.known_objects.retain_mut(|known_object| {
            known_object.forget_observations(now, remember_duration);
            if known_object.all_observations_forgotten() {
                debug!("evicting object {}", known_object.id());
                false
            } else {
                true
            }
        });
    }

    /// Greedy association, registry order: each known object claims the
    /// class-matching observation closest to its latest one. Claimed
    /// observations are removed from the list.
    fn match_observations_to_known_objects(&mut self, observations: &mut Vec<Observation>) {
        for known_object in &mut self.known_objects {
            if observations.is_empty() {
                return;
            }

            let best_match = find_best_match(
                observations,
                known_object.class_name(),
                known_object.current_observation(),
            );

            if let Some(index) = best_match {
                trace!("matched observation {index} to object {}", known_object.id());
                known_object.remember_observation(observations.remove(index));
            }
        }
    }

    pub fn reset(&mut self) {
        self.id_counter = 0;
        self.known_objects.clear();
    }

    /// Snapshot copy of the registry.
    pub fn known_objects(&self) -> Vec<KnownObject> {
        self.known_objects.clone()
    }

    pub fn known_objects_mut(&mut self) -> impl Iterator<Item = &mut KnownObject> {
        self.known_objects.iter_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.known_objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.known_objects.is_empty()
    }
}

fn wall_clock_us() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_micros() as i64
}

/// Index of the unclaimed observation minimising the center distance to
/// `reference`, among those with any candidate of class `class_name`.
/// Ties keep the earlier observation in input order.
fn find_best_match(
    observations: &[Observation],
    class_name: &str,
    reference: &Observation,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, observation) in observations.iter().enumerate() {
        let class_matches = observation
            .candidates()
            .iter()
            .any(|candidate| candidate.class_name == class_name);
        if !class_matches {
            continue;
        }

        let distance = reference.distance_to(observation);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }

    best.map(|(index, _)| index)
}
