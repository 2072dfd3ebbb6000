//! Read-only diagnostics over a dataset.
use crate::datasets::TrainingExample;
use crate::error::Result;
use crate::network::NetworkModel;

/// Round a sigmoid output to the nearest class (0.5 rounds up).
pub fn round_prediction(y: f64) -> f64 {
    y.round()
}

/// Percentage of examples whose rounded first output equals the first label.
///
/// Assumes single-output, near-binary targets. An empty dataset scores 0.
pub fn accuracy(dataset: &[TrainingExample], model: &NetworkModel) -> Result<f64> {
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0;
    for example in dataset {
        let pred = model.predict(&example.input)?;
        let hit = matches!((pred.first(), example.label.first()),
            (Some(&p), Some(&t)) if round_prediction(p) == t);
        if hit {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64 * 100.0)
}

/// Mean error signal of the model over a dataset, without updating it.
pub fn mean_error(dataset: &[TrainingExample], model: &NetworkModel) -> Result<f64> {
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for example in dataset {
        let pred = model.predict(&example.input)?;
        let err = crate::loss::output_error(&example.label, &pred)?;
        total += crate::loss::error_signal(&err);
    }
    Ok(total / dataset.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;

    // Output is sigmoid(2.0) for every input, so everything rounds to 1.
    fn always_one() -> NetworkModel {
        NetworkModel::from_parameters(
            NetworkConfig::new(2, 1, 1, 0.5),
            vec![vec![0.0], vec![0.0]],
            vec![vec![0.0]],
            vec![0.0],
            vec![2.0],
        )
        .unwrap()
    }

    #[test]
    fn rounding() {
        assert_eq!(round_prediction(0.49), 0.0);
        assert_eq!(round_prediction(0.5), 1.0);
        assert_eq!(round_prediction(0.93), 1.0);
    }

    #[test]
    fn accuracy_as_percentage() {
        let ds = crate::datasets::parse_dataset("0,0,0\n0,1,1\n1,0,1\n1,1,0", 2);
        let acc = accuracy(&ds, &always_one()).unwrap();
        assert_eq!(acc, 50.0);
        assert_eq!(accuracy(&[], &always_one()).unwrap(), 0.0);
    }

    #[test]
    fn mean_error_does_not_train() {
        let model = always_one();
        let ds = crate::datasets::parse_dataset("0,0,1", 2);
        let y = model.predict(&[0.0, 0.0]).unwrap()[0];
        let err = mean_error(&ds, &model).unwrap();
        assert!((err - (1.0 - y)).abs() < 1e-12);
        assert_eq!(model.weights_hidden_output(), &vec![vec![0.0]]);
    }
}
