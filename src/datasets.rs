//! Parsing training data from comma-separated text.
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

/// One input vector and its expected output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub input: Vec<f64>,
    pub label: Vec<f64>,
}

impl TrainingExample {
    pub fn new(input: Vec<f64>, label: Vec<f64>) -> Self {
        Self { input, label }
    }
}

pub type Dataset = Vec<TrainingExample>;

/// Parse `input1,...,inputN,expected` rows.
///
/// A row is kept when it has at least `input_size + 1` tokens and the first
/// `input_size + 1` of them are finite numbers; the token at `input_size`
/// becomes the single label. Anything else is skipped, so the result may be
/// empty but parsing never fails.
pub fn parse_dataset(text: &str, input_size: usize) -> Dataset {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut dataset = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(_) => continue,
        };
        if record.len() < input_size + 1 {
            continue;
        }
        let values: Option<Vec<f64>> = record
            .iter()
            .take(input_size + 1)
            .map(parse_token)
            .collect();
        if let Some(mut values) = values {
            let label = values.split_off(input_size);
            dataset.push(TrainingExample::new(values, label));
        }
    }
    dataset
}

fn parse_token(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
