use std::path::Path;

use tabled::Table;

use crate::{dataset::Dataset, error, info};

pub fn inspect(path: &Path) {
    let dataset = match Dataset::read(path) {
        Ok(d) => d,
        Err(e) => error!("Cannot read dataset. Err: {}", e),
    };

    if dataset.is_empty() {
        info!("{} holds no rows", path.display());
        return;
    }

    let liked = dataset.rows().iter().filter(|r| r.liked == Some(true)).count();
    info!(
        "{} rows, {} listened, {} liked",
        dataset.len(),
        dataset.rows().iter().filter(|r| r.listened).count(),
        liked
    );
    println!("{}", Table::new(dataset.summary()));
}
