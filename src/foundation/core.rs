use std::path::PathBuf;

/// One input file bound to its final position in the output sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub path: PathBuf,
}

impl WorkItem {
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }
}

/// Bind each path to its enumeration position.
pub fn work_items<I, P>(paths: I) -> Vec<WorkItem>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| WorkItem::new(index, path))
        .collect()
}

/// Frame display time in GIF ticks (1/100 s).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct DelayTicks(pub u16);

impl DelayTicks {
    pub fn as_millis(self) -> u32 {
        u32::from(self.0) * 10
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
