use tracing::{debug, warn};

use crate::{
    decode::quantize::QuantizedImage,
    foundation::{
        core::DelayTicks,
        error::{ConvertError, ConvertResult},
    },
    pipeline::slots::SlotTable,
    progress::{ProgressObserver, Stage},
};

/// One output frame: a quantized image and how long it stays on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub image: QuantizedImage,
    pub delay: DelayTicks,
}

/// Frames in enumeration order, ready for encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Build a sequence with a uniform delay.
    pub fn from_images(images: impl IntoIterator<Item = QuantizedImage>, delay: DelayTicks) -> Self {
        Self {
            frames: images
                .into_iter()
                .map(|image| Frame { image, delay })
                .collect(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

/// Turn a drained slot table into a frame sequence, or fail on the first bad slot.
///
/// All-or-nothing: a single failed slot fails the whole run with
/// [`ConvertError::Conversion`] naming that slot's index and path.
pub fn assemble(
    slots: SlotTable,
    delay: DelayTicks,
    progress: &dyn ProgressObserver,
) -> ConvertResult<FrameSequence> {
    let total = slots.len();
    let mut frames = Vec::with_capacity(total);
    progress.start(Stage::Assemble, total);

    for (i, slot) in slots.into_results().into_iter().enumerate() {
        let Some(result) = slot else {
            return Err(ConvertError::internal(format!(
                "frame slot {i} was never filled"
            )));
        };
        if result.index != i {
            return Err(ConvertError::internal(format!(
                "frame slot {i} holds result for index {}",
                result.index
            )));
        }

        match result.outcome {
            Ok(image) => frames.push(Frame { image, delay }),
            Err(cause) => {
                warn!(index = i, path = %result.path.display(), "aborting: frame failed to decode");
                return Err(ConvertError::Conversion {
                    index: i,
                    path: result.path,
                    cause: Box::new(cause),
                });
            }
        }
        progress.advance(Stage::Assemble, i + 1);
    }

    progress.finish(Stage::Assemble);
    debug!(frames = frames.len(), delay = delay.0, "assembled frame sequence");
    Ok(FrameSequence { frames })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/assemble.rs"]
mod tests;
