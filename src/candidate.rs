use serde_derive::{Deserialize, Serialize};

/// One classification hypothesis for a detection
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Candidate {
    pub class_name: String,
    pub class_index: i32,
    pub certainty: f32,
    pub colour: [u8; 3],
}

impl Candidate {
    pub fn new(class_name: impl Into<String>, class_index: i32, certainty: f32) -> Self {
        Self {
            class_name: class_name.into(),
            class_index,
            certainty,
            colour: [0, 0, 0],
        }
    }

    pub fn with_colour(mut self, colour: [u8; 3]) -> Self {
        self.colour = colour;
        self
    }
}
