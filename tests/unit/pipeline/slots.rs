use super::*;
use crate::decode::quantize::quantize_median_cut;

fn ok_result(index: usize) -> FrameResult {
    FrameResult {
        index,
        path: PathBuf::from(format!("{index}.png")),
        outcome: Ok(quantize_median_cut(&image::RgbaImage::new(1, 1), 2)),
    }
}

#[test]
fn starts_empty_with_fixed_len() {
    let table = SlotTable::with_len(3);
    assert_eq!(table.len(), 3);
    assert_eq!(table.filled(), 0);
    assert!(table.into_results().iter().all(Option::is_none));
}

#[test]
fn fill_is_index_addressed() {
    let table = SlotTable::with_len(3);
    table.fill(ok_result(2)).unwrap();
    table.fill(ok_result(0)).unwrap();
    assert_eq!(table.filled(), 2);

    let results = table.into_results();
    assert_eq!(results[0].as_ref().unwrap().index, 0);
    assert!(results[1].is_none());
    assert_eq!(results[2].as_ref().unwrap().index, 2);
}

#[test]
fn second_write_is_rejected() {
    let table = SlotTable::with_len(1);
    table.fill(ok_result(0)).unwrap();
    let err = table.fill(ok_result(0)).unwrap_err();
    assert!(err.to_string().contains("written twice"));
}

#[test]
fn out_of_range_write_is_rejected() {
    let table = SlotTable::with_len(1);
    let err = table.fill(ok_result(5)).unwrap_err();
    assert!(matches!(err, ConvertError::Internal(_)));
}

#[test]
fn concurrent_disjoint_writes_all_land() {
    let table = SlotTable::with_len(64);
    std::thread::scope(|s| {
        for t in 0..4 {
            let table = &table;
            s.spawn(move || {
                for i in (t..64).step_by(4) {
                    table.fill(ok_result(i)).unwrap();
                }
            });
        }
    });
    assert_eq!(table.filled(), 64);
}
