use crate::error::ServiceError;

/// Fixed label table for the stress classifier, indexed by class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressLabel {
    NoStress,
    LowStress,
    ModerateStress,
    HighStress,
}

impl StressLabel {
    pub const ALL: [StressLabel; 4] = [
        StressLabel::NoStress,
        StressLabel::LowStress,
        StressLabel::ModerateStress,
        StressLabel::HighStress,
    ];

    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn text(self) -> &'static str {
        match self {
            StressLabel::NoStress => "No Stress",
            StressLabel::LowStress => "Low Stress",
            StressLabel::ModerateStress => "Moderate Stress",
            StressLabel::HighStress => "High Stress",
        }
    }

    /// Coerce a raw classifier output to a label, truncating toward zero.
    pub fn from_prediction(value: f64) -> Result<Self, ServiceError> {
        if !value.is_finite() {
            return Err(ServiceError::InvalidOutput {
                message: format!("classifier returned {value}"),
            });
        }
        StressLabel::try_from(value.trunc() as i64)
    }
}

impl TryFrom<i64> for StressLabel {
    type Error = ServiceError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| StressLabel::ALL.get(i).copied())
            .ok_or(ServiceError::OutOfRangeLabel(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_table() {
        let texts: Vec<&str> = StressLabel::ALL.iter().map(|l| l.text()).collect();
        assert_eq!(
            texts,
            vec!["No Stress", "Low Stress", "Moderate Stress", "High Stress"]
        );
        for (i, label) in StressLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i as i64);
        }
    }

    #[test]
    fn test_out_of_range_index() {
        assert!(matches!(
            StressLabel::try_from(4),
            Err(ServiceError::OutOfRangeLabel(4))
        ));
        assert!(matches!(
            StressLabel::try_from(-1),
            Err(ServiceError::OutOfRangeLabel(-1))
        ));
    }

    #[test]
    fn test_from_prediction_truncates() {
        assert_eq!(
            StressLabel::from_prediction(2.0).unwrap(),
            StressLabel::ModerateStress
        );
        assert_eq!(
            StressLabel::from_prediction(1.9).unwrap(),
            StressLabel::LowStress
        );
    }

    #[test]
    fn test_from_prediction_nan() {
        assert!(matches!(
            StressLabel::from_prediction(f64::NAN),
            Err(ServiceError::InvalidOutput { .. })
        ));
    }
}
