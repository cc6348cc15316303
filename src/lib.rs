pub mod bbox;
pub mod candidate;
pub mod detected;
pub mod error;
pub mod evaluator;
pub mod known_object;
pub mod math;
pub mod memory;
pub mod observation;
pub mod relations;

pub use bbox::BoundingBox3;
pub use candidate::Candidate;
pub use detected::{resolve_detected_objects, BoxEstimator, DetectedObject};
pub use error::Error;
pub use evaluator::{evaluate_relations, serialise, unserialise};
pub use known_object::KnownObject;
pub use memory::Memory;
pub use observation::Observation;
pub use relations::Relations;

use std::time::Duration;

/// Whole pipeline behind a single entry point: feeds per-frame observations
/// into the working memory, resolves 3D boxes through the estimator seam and
/// classifies the pairwise spatial relations of the resulting snapshot.
pub struct RelationTracker<E: BoxEstimator> {
    memory: Memory,
    estimator: E,
    smoothing: Duration,
    distance_equality_threshold: f64,
}

impl<E: BoxEstimator> RelationTracker<E> {
    pub fn new(
        estimator: E,
        initial_certainty_threshold: f32,
        remember_duration: Duration,
        smoothing: Duration,
        distance_equality_threshold: f64,
    ) -> Self {
        Self {
            memory: Memory::new(initial_certainty_threshold, remember_duration),
            estimator,
            smoothing,
            distance_equality_threshold,
        }
    }

    /// Runs one tracking cycle and returns the frame snapshot together with
    /// its relation matrix (same index order). `now` overrides the wall
    /// clock for deterministic replay.
    pub fn process_frame(
        &mut self,
        observations: Vec<Observation>,
        now: Option<i64>,
    ) -> (Vec<DetectedObject>, Vec<Vec<Relations>>) {
        let frame_seen_at = observations.iter().map(Observation::seen_at).max();

        self.memory.make_observations(observations, now);

        let objects = match frame_seen_at {
            Some(seen_at) => resolve_detected_objects(
                &mut self.memory,
                &mut self.estimator,
                self.smoothing,
                seen_at,
            ),
            None => Vec::new(),
        };
        let matrix = evaluate_relations(&objects, self.distance_equality_threshold);

        (objects, matrix)
    }

    #[inline]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    #[inline]
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn reset(&mut self) {
        self.memory.reset();
    }
}
