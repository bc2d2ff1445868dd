/// Pipeline stage reported to a [`ProgressObserver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Enumerate,
    Decode,
    Assemble,
    Encode,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Enumerate => "files",
            Stage::Decode => "decode",
            Stage::Assemble => "assemble",
            Stage::Encode => "encode",
        }
    }
}

/// Optional observer of pipeline progress.
///
/// `advance` is called from pool workers concurrently. `done` comes from a shared counter,
/// so each value within a stage is reported once, though calls may arrive out of order.
/// Nothing in the pipeline depends on what an observer does.
pub trait ProgressObserver: Sync {
    fn start(&self, _stage: Stage, _total: usize) {}
    fn advance(&self, _stage: Stage, _done: usize) {}
    fn finish(&self, _stage: Stage) {}
}

/// No-op observer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}
