//! Property tests for the batched writer.
//!
//! For any record count and batch size, a run against a fresh table leaves
//! exactly one row per key holding the key's decimal string.

mod common;

use std::num::NonZeroUsize;

use batchwrite::storage::batch::{BatchConfig, FlushPolicy};
use batchwrite::storage::schema::count_rows;
use batchwrite::{write_records, NullSink, SqliteStore, Store, WriteOptions};
use common::{rows, table};
use proptest::prelude::*;

fn policy() -> impl Strategy<Value = FlushPolicy> {
    prop_oneof![Just(FlushPolicy::Fixed), Just(FlushPolicy::Legacy)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn write_leaves_one_row_per_key(
        records in 0u32..1500,
        batch_size in 1usize..700,
        policy in policy(),
        start_manual in any::<bool>(),
    ) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set_auto_commit(!start_manual).unwrap();
        let t = table("prop");
        let options = WriteOptions::new(
            records,
            BatchConfig::new(NonZeroUsize::new(batch_size).unwrap(), policy),
        );

        let report = write_records(&mut store, &t, &options, &mut NullSink).unwrap();

        prop_assert_eq!(report.row_count, i64::from(records));
        prop_assert_eq!(report.batches.iter().sum::<usize>(), records as usize);
        prop_assert!(report.batches.iter().all(|&n| n >= 1 && n <= batch_size));
        prop_assert_eq!(store.auto_commit().unwrap(), !start_manual);
        prop_assert_eq!(count_rows(&mut store, &t).unwrap(), i64::from(records));

        let stored = rows(&store, &t);
        for (i, (pk, data)) in stored.into_iter().enumerate() {
            prop_assert_eq!(pk, i as i64);
            prop_assert_eq!(data, i.to_string());
        }
    }
}
