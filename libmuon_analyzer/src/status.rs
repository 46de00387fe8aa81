/// Progress of a processing pass, reported after each detector step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessStatus {
    /// Fraction of the pass that is complete, from 0 to 1
    pub progress: f32,
    pub detector_index: usize,
    pub label: String,
}

impl ProcessStatus {
    pub fn new(progress: f32, detector_index: usize, label: &str) -> Self {
        Self {
            progress,
            detector_index,
            label: label.to_string(),
        }
    }
}
