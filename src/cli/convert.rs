use std::path::Path;

use tabled::Table;

use crate::{
    convert::{self, ConvertPolicy},
    error, success, utils, warning,
};

pub fn convert(source_dir: &Path, dest_dir: &Path, policy: ConvertPolicy) {
    let pb = utils::spinner(format!("Converting files in {}...", source_dir.display()));
    let report = convert::convert_all(source_dir, dest_dir, policy);
    pb.finish_and_clear();

    let report = match report {
        Ok(r) => r,
        Err(e) => error!("Conversion failed. Err: {}", e),
    };

    if report.converted.is_empty() && report.failed.is_empty() {
        warning!("No CSV files found in {}", source_dir.display());
        return;
    }

    if !report.converted.is_empty() {
        println!("{}", Table::new(report.table_rows()));
    }

    for failure in &report.failed {
        warning!("{}: {}", failure.source.display(), failure.error);
    }

    success!(
        "Converted {} files, {} failed",
        report.converted.len(),
        report.failed.len()
    );
}
