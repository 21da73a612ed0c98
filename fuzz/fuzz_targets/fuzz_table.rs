#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Write fuzz data to a temp file and try to parse it
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(data).unwrap();
    let path = f.path().to_path_buf();

    // Should not panic regardless of input
    if let Ok(table) = myxostat::io::table::parse_table(&path) {
        // Typed accessors must also stay panic-free.
        for row in 0..table.n_rows() {
            for column in table.header().to_vec() {
                let _ = table.field(row, &column);
                let _ = table.f64_field(row, &column);
                let _ = table.i32_field(row, &column);
            }
        }
        let _ = myxostat::assay::observation::load(&table);
    }
});
