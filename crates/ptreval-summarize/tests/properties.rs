use std::io::Cursor;

use proptest::prelude::*;
use ptreval_summarize::{Accumulator, summarize_reader};
use ptreval_types::{CommonMeasurement, MeasurementRecord, Sample};

fn lines(values: &[(u8, f64)]) -> Vec<String> {
    values
        .iter()
        .map(|(file, ms)| {
            let mut record = MeasurementRecord {
                file: format!("f{file}.R"),
                ..Default::default()
            };
            record.common.insert(CommonMeasurement::Total, Sample(*ms));
            record.input.number_of_tokens = Sample(7.0);
            record.dataflow.number_of_nodes = Sample(*ms * 2.0);
            serde_json::to_string(&record).unwrap()
        })
        .collect()
}

proptest! {
    #[test]
    fn accumulator_is_order_invariant(values in prop::collection::vec(-1.0e6f64..1.0e6, 0..40)) {
        let forward: Accumulator = values.iter().copied().collect();
        let backward: Accumulator = values.iter().rev().copied().collect();
        let a = forward.finish();
        let b = backward.finish();
        prop_assert_eq!(a.mean.to_bits(), b.mean.to_bits());
        prop_assert_eq!(a.std.to_bits(), b.std.to_bits());
        prop_assert_eq!(a.total.to_bits(), b.total.to_bits());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn report_is_order_invariant(values in prop::collection::vec((0u8..5, 0.0f64..1.0e4), 0..30)) {
        let forward = lines(&values).join("\n");
        let mut reversed = lines(&values);
        reversed.reverse();
        let backward = reversed.join("\n");

        let a = summarize_reader(Cursor::new(forward), None).unwrap();
        let b = summarize_reader(Cursor::new(backward), None).unwrap();

        prop_assert_eq!(a.report, b.report);
        prop_assert_eq!(a.records, values.len() as u64);
    }

    #[test]
    fn min_le_median_le_max(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..40)) {
        let m = values.iter().copied().collect::<Accumulator>().finish();
        prop_assert!(m.min <= m.median && m.median <= m.max);
        prop_assert!(m.std >= 0.0);
    }
}
