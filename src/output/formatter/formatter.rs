use crate::error::Result;
use crate::model::Sample;

pub trait Formatter {
    fn format(&self, sample: &Sample) -> Result<Vec<u8>>;
}

/// Prometheus spelling of non-finite values.
pub(super) fn special_value(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("+Inf")
    } else if value == f64::NEG_INFINITY {
        Some("-Inf")
    } else {
        None
    }
}
