use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    config::ConvertConfig,
    decode::frame::{FrameDecoder, PaletteDecoder},
    encode::gif::write_gif,
    foundation::{
        core::work_items,
        error::{ConvertError, ConvertResult},
    },
    pipeline::{
        assemble::{FrameSequence, assemble},
        pool::run_pool,
    },
    progress::{ProgressObserver, Stage},
    source::enumerate::{enumerate_sources, without_path},
};

/// Summary of a finished conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ConvertStats {
    pub frames: usize,
    pub concurrency: usize,
    pub delay_ticks: u16,
    /// Palette size from the config. A decoder passed to [`convert_paths`] may quantize to
    /// a different size; this field does not inspect it.
    pub palette_size: usize,
    pub bytes_written: u64,
}

/// Decode `paths` on the worker pool and assemble them into an ordered sequence.
///
/// Frame `i` of the result always comes from `paths[i]`.
pub fn build_sequence(
    paths: &[PathBuf],
    cfg: &ConvertConfig,
    decoder: &dyn FrameDecoder,
    progress: &dyn ProgressObserver,
) -> ConvertResult<FrameSequence> {
    cfg.validate()?;
    let items = work_items(paths.iter().cloned());
    let slots = run_pool(&items, cfg.concurrency, decoder, progress)?;
    assemble(slots, cfg.delay_ticks, progress)
}

/// Convert an explicit, ordered list of images into one GIF at `out_path`.
///
/// Nothing is written unless every input decodes.
pub fn convert_paths(
    paths: &[PathBuf],
    out_path: &Path,
    cfg: &ConvertConfig,
    decoder: &dyn FrameDecoder,
    progress: &dyn ProgressObserver,
) -> ConvertResult<ConvertStats> {
    cfg.validate()?;
    if paths.is_empty() {
        return Err(ConvertError::NothingToDo("input list is empty".to_string()));
    }

    let seq = build_sequence(paths, cfg, decoder, progress)?;

    progress.start(Stage::Encode, 1);
    let bytes_written = write_gif(&seq, out_path)?;
    progress.advance(Stage::Encode, 1);
    progress.finish(Stage::Encode);

    info!(
        frames = seq.len(),
        bytes = bytes_written,
        out = %out_path.display(),
        "wrote gif"
    );
    Ok(ConvertStats {
        frames: seq.len(),
        concurrency: cfg.concurrency,
        delay_ticks: cfg.delay_ticks.0,
        palette_size: cfg.palette_size,
        bytes_written,
    })
}

/// Convert every image in `dir` (file-name order) into one GIF at `out_path`.
#[tracing::instrument(skip(cfg, progress))]
pub fn convert_dir(
    dir: &Path,
    out_path: &Path,
    cfg: &ConvertConfig,
    progress: &dyn ProgressObserver,
) -> ConvertResult<ConvertStats> {
    cfg.validate()?;

    let paths = without_path(enumerate_sources(dir)?, out_path);
    progress.start(Stage::Enumerate, paths.len());
    progress.advance(Stage::Enumerate, paths.len());
    progress.finish(Stage::Enumerate);

    if paths.is_empty() {
        return Err(ConvertError::NothingToDo(format!(
            "no input images found in '{}'",
            dir.display()
        )));
    }
    info!(
        inputs = paths.len(),
        workers = cfg.concurrency,
        "converting directory"
    );

    let decoder = PaletteDecoder::new(cfg.palette_size)?;
    convert_paths(&paths, out_path, cfg, &decoder, progress)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/convert.rs"]
mod tests;
