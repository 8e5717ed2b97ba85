use cuckoo_table::{FilterTable, InsertOutcome};

fn main() {
    let mut table = FilterTable::create(12, 1000, 2_000_000).expect("valid table config");

    for _ in 0..4 {
        table.insert_tag_into_bucket(5, 0x1F, false);
    }

    match table.insert_tag_into_bucket(5, 0x2A, true) {
        InsertOutcome::Evicted(old) => println!("bucket 5 full, kicked tag {:#x}", old),
        outcome => println!("unexpected outcome: {:?}", outcome),
    }

    println!("bucket 5: {:x?}", table.bucket_tags(5));
    println!("storage: {} bits", table.storage_bits());
}
