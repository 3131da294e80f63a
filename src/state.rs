use std::sync::Arc;

use crate::path::PathAllocator;
use crate::pipeline::SubmissionPipeline;
use crate::vault::SecretWriter;

pub type SharedPipeline = Arc<SubmissionPipeline<Box<dyn PathAllocator>, Box<dyn SecretWriter>>>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: SharedPipeline,
}

impl AppState {
    pub fn new(pipeline: SharedPipeline) -> Self {
        Self { pipeline }
    }
}
