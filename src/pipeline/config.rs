use std::collections::HashMap;

use crate::pipeline::sink::Sink;

/// Upstream request size used when nothing more specific is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 16;

/// Chunk sizes for a [`Pipeline`](crate::pipeline::chain::Pipeline).
///
/// Stages are looked up by [`Stage::name`](crate::pipeline::stage::Stage::name);
/// unknown names fall back to the stage's own default.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    chunk_size: usize,
    sink_chunk_size: Option<usize>,
    stage_chunk_sizes: HashMap<&'static str, usize>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            sink_chunk_size: Some(DEFAULT_CHUNK_SIZE),
            stage_chunk_sizes: HashMap::new(),
        }
    }

    /// Chunk size for stages added without a spec of their own.
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    pub fn stage_chunk_size(mut self, stage: &'static str, n: usize) -> Self {
        self.stage_chunk_sizes.insert(stage, n.max(1));
        self
    }

    pub fn sink_chunk_size(mut self, n: usize) -> Self {
        self.sink_chunk_size = Some(n.max(1));
        self
    }

    /// Let the sink drain the whole pipeline in one read.
    pub fn unbounded_sink(mut self) -> Self {
        self.sink_chunk_size = None;
        self
    }

    pub fn global_chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_size_for(&self, stage: &'static str, fallback: usize) -> usize {
        self.stage_chunk_sizes
            .get(stage)
            .copied()
            .unwrap_or(fallback)
    }

    pub fn sink(&self) -> Sink {
        match self.sink_chunk_size {
            Some(n) => Sink::new().chunk_size(n),
            None => Sink::new().unbounded(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_override_wins_over_fallback() {
        let cfg = PipelineConfig::new().stage_chunk_size("split", 8);
        assert_eq!(cfg.chunk_size_for("split", 1024), 8);
        assert_eq!(cfg.chunk_size_for("join", 1024), 1024);
    }

    #[test]
    fn sizes_are_clamped_to_one() {
        let cfg = PipelineConfig::new().chunk_size(0).stage_chunk_size("x", 0);
        assert_eq!(cfg.global_chunk_size(), 1);
        assert_eq!(cfg.chunk_size_for("x", 5), 1);
    }
}
