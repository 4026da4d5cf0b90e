use log::debug;

use crate::core::domain::{MaskedPixelSet, Sample};
use crate::core::error::{PhiError, PhiResult};
use crate::preprocessing::uncertainty::UncertaintyModel;

/// Extract the pixels selected by a zone mask, attaching a variance to each.
///
/// The three layers must be aligned element by element; `mask` selects with
/// ones and discards with zeros. Selected pixels are kept even when their
/// value or derived variance is degenerate, so that validity is decided in
/// one place at aggregation time.
///
/// # Arguments
/// * `values` - Pixel values in layer order
/// * `uncertainties` - Reported uncertainty band, aligned with `values`
/// * `mask` - Zone mask, aligned with `values`
/// * `model` - Conversion from the band to a variance
///
/// # Returns
/// The masked pixel set, or `ShapeMismatch` when the layers disagree in
/// length.
pub fn extract_masked_pixels(
    values: &[f64],
    uncertainties: &[f64],
    mask: &[u8],
    model: UncertaintyModel,
) -> PhiResult<MaskedPixelSet> {
    if uncertainties.len() != values.len() {
        return Err(PhiError::ShapeMismatch {
            expected: values.len(),
            actual: uncertainties.len(),
        });
    }
    if mask.len() != values.len() {
        return Err(PhiError::ShapeMismatch {
            expected: values.len(),
            actual: mask.len(),
        });
    }

    let samples: Vec<Sample> = values
        .iter()
        .zip(uncertainties)
        .zip(mask)
        .filter(|(_, &m)| m == 1)
        .map(|((&value, &uncertainty), _)| Sample::new(value, model.variance(value, uncertainty)))
        .collect();

    debug!("mask selected {} of {} pixels", samples.len(), values.len());

    Ok(MaskedPixelSet::new(samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_selects_matching_pixels() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let uncertainties = [0.1, 0.2, 0.3, 0.4];
        let mask = [1, 0, 1, 0];

        let pixels = extract_masked_pixels(
            &values,
            &uncertainties,
            &mask,
            UncertaintyModel::StandardDeviation,
        )
        .unwrap();

        assert_eq!(pixels.len(), 2);
        let samples = pixels.samples();
        assert!((samples[0].value - 1.0).abs() < 1e-12);
        assert!((samples[0].variance - 0.01).abs() < 1e-12);
        assert!((samples[1].value - 3.0).abs() < 1e-12);
        assert!((samples[1].variance - 0.09).abs() < 1e-12);
    }

    #[test]
    fn mismatched_uncertainty_length_is_rejected() {
        let err = extract_masked_pixels(
            &[1.0, 2.0],
            &[0.1],
            &[1, 1],
            UncertaintyModel::StandardDeviation,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PhiError::ShapeMismatch { expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn mismatched_mask_length_is_rejected() {
        let err = extract_masked_pixels(
            &[1.0, 2.0],
            &[0.1, 0.2],
            &[1],
            UncertaintyModel::StandardDeviation,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PhiError::ShapeMismatch { expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn degenerate_pixels_survive_extraction() {
        let values = [f64::NAN, 5.0];
        let uncertainties = [0.1, 0.0];
        let mask = [1, 1];

        let pixels = extract_masked_pixels(
            &values,
            &uncertainties,
            &mask,
            UncertaintyModel::StandardDeviation,
        )
        .unwrap();

        // kept here, rejected later by Sample::is_valid at aggregation
        assert_eq!(pixels.len(), 2);
        assert!(!pixels.samples()[0].is_valid());
        assert!(!pixels.samples()[1].is_valid());
    }

    #[test]
    fn empty_mask_yields_empty_set() {
        let pixels = extract_masked_pixels(
            &[1.0, 2.0],
            &[0.1, 0.2],
            &[0, 0],
            UncertaintyModel::StandardDeviation,
        )
        .unwrap();
        assert!(pixels.is_empty());
    }
}
