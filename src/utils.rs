//! Console helpers and the stock XOR data.
use crate::datasets::{parse_dataset, Dataset};
use crate::network::NetworkModel;

/// Default training text: the XOR truth table.
pub const XOR_TEXT: &str = "0,0,0\n0,1,1\n1,0,1\n1,1,0";

pub fn xor_dataset() -> Dataset {
    parse_dataset(XOR_TEXT, 2)
}

/// Print model summary
pub fn print_model_summary(model: &NetworkModel) {
    println!("Model Summary:\n{}", model);
}

/// Print simple table for per-epoch errors
pub fn print_summary_table(values: &[f64], title: &str) {
    println!("\n{} Summary Table:", title);
    println!("+----------------+----------+");
    println!("| Epoch Range    | Avg Value|");
    println!("+----------------+----------+");
    for (label, range) in summary_rows(values.len()) {
        let slice = &values[range];
        let avg = slice.iter().sum::<f64>() / slice.len() as f64;
        println!("| {:<14} | {:>8.6} |", label, avg);
    }
    println!("+----------------+----------+");
}

/// First quarter, last quarter and the whole run.
fn summary_rows(n: usize) -> Vec<(String, std::ops::Range<usize>)> {
    if n == 0 {
        return Vec::new();
    }
    let q = (n / 4).max(1);
    let mut rows = Vec::new();
    if n >= 4 {
        rows.push((format!("1-{}", q), 0..q));
        rows.push((format!("{}-{}", n - q + 1, n), n - q..n));
    }
    rows.push(("All Epochs".to_string(), 0..n));
    rows
}
