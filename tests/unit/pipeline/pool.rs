use std::{path::PathBuf, sync::Mutex, time::Duration};

use super::*;
use crate::{decode::quantize::quantize_median_cut, foundation::core::work_items};

/// Frame whose single pixel encodes the numeric file stem.
fn stem_frame(path: &Path) -> ConvertResult<QuantizedImage> {
    let n: u8 = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ConvertError::internal(format!("bad test path {}", path.display())))?;
    let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([n, 0, 0, 255]));
    Ok(quantize_median_cut(&img, 2))
}

fn numbered_items(n: usize) -> Vec<WorkItem> {
    work_items((0..n).map(|i| PathBuf::from(format!("{i}.png"))))
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(Stage, &'static str, usize)>>,
}

impl ProgressObserver for Recorder {
    fn start(&self, stage: Stage, total: usize) {
        self.events.lock().unwrap().push((stage, "start", total));
    }
    fn advance(&self, stage: Stage, done: usize) {
        self.events.lock().unwrap().push((stage, "advance", done));
    }
    fn finish(&self, stage: Stage) {
        self.events.lock().unwrap().push((stage, "finish", 0));
    }
}

#[test]
fn every_slot_is_filled_at_its_own_index() {
    for workers in [1usize, 3, 8, 16] {
        let items = numbered_items(8);
        let slots = run_pool(&items, workers, &stem_frame, &crate::NoProgress).unwrap();
        assert_eq!(slots.filled(), 8);

        for (i, slot) in slots.into_results().into_iter().enumerate() {
            let r = slot.expect("filled");
            assert_eq!(r.index, i);
            assert_eq!(r.path, PathBuf::from(format!("{i}.png")));
            let frame = r.outcome.unwrap();
            assert_eq!(frame.palette()[usize::from(frame.indices()[0])][0], i as u8);
        }
    }
}

#[test]
fn out_of_order_completion_keeps_slot_order() {
    // Early items sleep longest, so they finish last.
    let slow_first = |path: &Path| -> ConvertResult<QuantizedImage> {
        let frame = stem_frame(path)?;
        let n = u64::from(frame.palette()[0][0]);
        std::thread::sleep(Duration::from_millis(5 * (6 - n)));
        Ok(frame)
    };

    let items = numbered_items(6);
    let results = run_pool(&items, 6, &slow_first, &crate::NoProgress)
        .unwrap()
        .into_results();
    for (i, r) in results.into_iter().enumerate() {
        let frame = r.unwrap().outcome.unwrap();
        assert_eq!(frame.palette()[0][0], i as u8);
    }
}

#[test]
fn never_exceeds_requested_concurrency() {
    let active = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    let tracking = |path: &Path| -> ConvertResult<QuantizedImage> {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(2));
        active.fetch_sub(1, Ordering::SeqCst);
        stem_frame(path)
    };

    let items = numbered_items(20);
    run_pool(&items, 3, &tracking, &crate::NoProgress).unwrap();
    let peak = peak.load(Ordering::SeqCst);
    assert!((1..=3).contains(&peak), "peak concurrency {peak}");
}

#[test]
fn failures_are_recorded_without_stopping_siblings() {
    let fail_on_two = |path: &Path| -> ConvertResult<QuantizedImage> {
        if path == Path::new("2.png") {
            return Err(ConvertError::Decode {
                path: path.to_path_buf(),
                source: std::io::Error::other("unreadable"),
            });
        }
        stem_frame(path)
    };

    let items = numbered_items(5);
    let results = run_pool(&items, 2, &fail_on_two, &crate::NoProgress)
        .unwrap()
        .into_results();
    assert_eq!(results.len(), 5);
    for (i, r) in results.into_iter().enumerate() {
        let r = r.unwrap();
        assert_eq!(r.outcome.is_err(), i == 2);
    }
}

#[test]
fn decoder_panics_become_slot_errors() {
    let panics_on_one = |path: &Path| -> ConvertResult<QuantizedImage> {
        if path == Path::new("1.png") {
            panic!("decoder exploded");
        }
        stem_frame(path)
    };

    let items = numbered_items(3);
    let results = run_pool(&items, 2, &panics_on_one, &crate::NoProgress)
        .unwrap()
        .into_results();
    let err = results[1].as_ref().unwrap().outcome.as_ref().unwrap_err();
    match err {
        ConvertError::WorkerPanic { message, .. } => assert!(message.contains("exploded")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(results[0].as_ref().unwrap().outcome.is_ok());
    assert!(results[2].as_ref().unwrap().outcome.is_ok());
}

#[test]
fn zero_concurrency_is_rejected_before_work_starts() {
    let calls = AtomicUsize::new(0);
    let counting = |path: &Path| -> ConvertResult<QuantizedImage> {
        calls.fetch_add(1, Ordering::SeqCst);
        stem_frame(path)
    };
    let err = run_pool(&numbered_items(2), 0, &counting, &crate::NoProgress).unwrap_err();
    assert!(matches!(err, ConvertError::Config(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn huge_concurrency_on_a_single_item_returns_promptly() {
    let started = std::time::Instant::now();
    let slots = run_pool(&numbered_items(1), 100_000, &stem_frame, &crate::NoProgress).unwrap();
    assert_eq!(slots.filled(), 1);
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "took {:?}",
        started.elapsed()
    );
}

#[test]
fn misnumbered_items_are_rejected() {
    let items = vec![WorkItem::new(1, "1.png")];
    assert!(run_pool(&items, 1, &stem_frame, &crate::NoProgress).is_err());
}

#[test]
fn empty_input_yields_empty_table() {
    let slots = run_pool(&[], 4, &stem_frame, &crate::NoProgress).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn progress_reports_each_item_once() {
    let recorder = Recorder::default();
    run_pool(&numbered_items(7), 3, &stem_frame, &recorder).unwrap();

    let events = recorder.events.into_inner().unwrap();
    assert_eq!(events.first(), Some(&(Stage::Decode, "start", 7)));
    assert_eq!(events.last(), Some(&(Stage::Decode, "finish", 0)));

    let mut advances: Vec<usize> = events
        .iter()
        .filter(|(_, kind, _)| *kind == "advance")
        .map(|(_, _, n)| *n)
        .collect();
    advances.sort_unstable();
    assert_eq!(advances, (1..=7).collect::<Vec<_>>());
}

#[test]
fn queue_hands_out_each_item_once() {
    let items = numbered_items(3);
    let queue = WorkQueue::new(&items);
    let drained: Vec<usize> = std::iter::from_fn(|| queue.try_dequeue())
        .map(|i| i.index)
        .collect();
    assert_eq!(drained, vec![0, 1, 2]);
    assert!(queue.try_dequeue().is_none());
}
