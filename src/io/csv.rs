/*!
# Saving Samples to CSV

Writes the output of [`crate::core::MultiChain::run`] to a CSV file. Enable via the `csv`
feature.
*/

use ndarray::{Array3, Axis};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/**
Saves samples shaped **chain × sample × dimension** as a CSV file.

The file has a header row `chain,sample,dim_0,dim_1,...` followed by one row per sample
of each chain.

# Examples

```rust
use bodywalk::io::csv::save_csv;
use ndarray::arr3;

// One chain with 2 samples in 4 dimensions.
let data = arr3(&[[[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]]);
let path = std::env::temp_dir().join("bodywalk_doc.csv");

save_csv(&data, &path)?;
# Ok::<(), bodywalk::io::csv::SaveError>(())
```
*/
pub fn save_csv(data: &Array3<f64>, path: impl AsRef<Path>) -> Result<(), SaveError> {
    write_csv(data, File::create(path)?)
}

/// Same as [`save_csv`], but writes to any [`Write`] sink.
pub fn write_csv<W: Write>(data: &Array3<f64>, sink: W) -> Result<(), SaveError> {
    let mut wtr = csv::Writer::from_writer(sink);

    let mut header = vec!["chain".to_string(), "sample".to_string()];
    header.extend((0..data.shape()[2]).map(|i| format!("dim_{i}")));
    wtr.write_record(&header)?;

    for (chain_idx, chain) in data.axis_iter(Axis(0)).enumerate() {
        for (sample_idx, sample) in chain.axis_iter(Axis(0)).enumerate() {
            let mut row = vec![chain_idx.to_string(), sample_idx.to_string()];
            row.extend(sample.iter().map(f64::to_string));
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}
