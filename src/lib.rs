//! Batch-convert a directory of still images into one animated GIF.
//!
//! # Pipeline overview
//!
//! 1. **Enumerate**: list the input directory in file-name order ([`enumerate_sources`])
//! 2. **Decode**: a pool of up to `concurrency` workers decodes and median-cut quantizes
//!    every file ([`run_pool`], [`FrameDecoder`]), writing each result into its own slot
//!    of a preallocated [`SlotTable`]
//! 3. **Assemble**: once the pool has drained, walk the slots in order and build a
//!    [`FrameSequence`], failing the whole run on the first bad slot ([`assemble`])
//! 4. **Encode**: serialize the sequence as an infinitely looping GIF ([`write_gif`])
//!
//! Output order is input order no matter which worker finishes first, and a single bad
//! input means no output file at all.
#![forbid(unsafe_code)]

mod config;
mod decode;
mod encode;
mod foundation;
mod pipeline;
mod progress;
mod source;

pub use config::{
    ConvertConfig, DEFAULT_CONCURRENCY, DEFAULT_PALETTE_SIZE, MAX_PALETTE_SIZE, MIN_PALETTE_SIZE,
};
pub use decode::frame::{FrameDecoder, PaletteDecoder, decode_frame};
pub use decode::quantize::{ALPHA_THRESHOLD, QuantizedImage, quantize_median_cut};
pub use encode::gif::{
    MAX_GIF_DIMENSION, encode_gif, ensure_parent_dir, validate_sequence, write_gif,
};
pub use foundation::core::{DelayTicks, WorkItem, work_items};
pub use foundation::error::{ConvertError, ConvertResult};
pub use pipeline::assemble::{Frame, FrameSequence, assemble};
pub use pipeline::convert::{ConvertStats, build_sequence, convert_dir, convert_paths};
pub use pipeline::pool::run_pool;
pub use pipeline::slots::{FrameResult, SlotTable};
pub use progress::{NoProgress, ProgressObserver, Stage};
pub use source::enumerate::{enumerate_sources, without_path};
