use std::{
    fs::File,
    io::Write as _,
    path::{Path, PathBuf},
};

use image::{
    Delay,
    codecs::gif::{GifEncoder, Repeat},
};
use tracing::{debug, warn};

use crate::{
    foundation::error::{ConvertError, ConvertResult},
    pipeline::assemble::FrameSequence,
};

/// GIF logical screen dimensions are 16-bit.
pub const MAX_GIF_DIMENSION: u32 = u16::MAX as u32;

/// Check that `seq` can be written as one GIF and return its shared dimensions.
pub fn validate_sequence(seq: &FrameSequence) -> ConvertResult<(u32, u32)> {
    let Some(first) = seq.frames().first() else {
        return Err(ConvertError::encode("frame sequence is empty"));
    };

    let (width, height) = first.image.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::encode("frame width/height must be non-zero"));
    }
    if width > MAX_GIF_DIMENSION || height > MAX_GIF_DIMENSION {
        return Err(ConvertError::encode(format!(
            "frame size {width}x{height} exceeds the GIF limit of {MAX_GIF_DIMENSION}"
        )));
    }

    for (i, frame) in seq.frames().iter().enumerate().skip(1) {
        let (w, h) = frame.image.dimensions();
        if (w, h) != (width, height) {
            return Err(ConvertError::encode(format!(
                "frame size mismatch at frame {i}: got {w}x{h}, expected {width}x{height}"
            )));
        }
    }

    Ok((width, height))
}

/// Encode `seq` as an infinitely looping animated GIF held in memory.
pub fn encode_gif(seq: &FrameSequence) -> ConvertResult<Vec<u8>> {
    let (width, height) = validate_sequence(seq)?;

    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        enc.set_repeat(Repeat::Infinite)
            .map_err(|e| ConvertError::encode(format!("set loop count: {e}")))?;

        for (i, frame) in seq.frames().iter().enumerate() {
            let delay = Delay::from_numer_denom_ms(frame.delay.as_millis(), 1);
            let rgba = frame.image.to_rgba8();
            enc.encode_frame(image::Frame::from_parts(rgba, 0, 0, delay))
                .map_err(|e| ConvertError::encode(format!("encode frame {i}: {e}")))?;
        }
        // Dropping the encoder writes the GIF trailer.
    }

    debug!(
        frames = seq.len(),
        width,
        height,
        bytes = buf.len(),
        "encoded gif"
    );
    Ok(buf)
}

/// Encode `seq` and write it to `out_path`, creating parent directories and truncating any
/// existing file. Returns the number of bytes written.
///
/// Encoding finishes before the file is touched. If writing fails midway the partial file
/// is removed.
pub fn write_gif(seq: &FrameSequence, out_path: &Path) -> ConvertResult<u64> {
    let bytes = encode_gif(seq)?;
    let io_err = |source: std::io::Error| ConvertError::Io {
        path: out_path.to_path_buf(),
        source,
    };

    ensure_parent_dir(out_path)?;
    let mut f = File::create(out_path).map_err(io_err)?;
    let mut guard = PartialOutputGuard(Some(out_path.to_path_buf()));
    f.write_all(&bytes).map_err(io_err)?;
    f.sync_all().map_err(io_err)?;
    drop(f);
    guard.commit();

    Ok(bytes.len() as u64)
}

pub fn ensure_parent_dir(path: &Path) -> ConvertResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| ConvertError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Removes a half-written output file unless committed.
struct PartialOutputGuard(Option<PathBuf>);

impl PartialOutputGuard {
    fn commit(&mut self) {
        self.0 = None;
    }
}

impl Drop for PartialOutputGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take()
            && let Err(e) = std::fs::remove_file(&path)
        {
            warn!(path = %path.display(), error = %e, "failed to remove partial output");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
