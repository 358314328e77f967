use std::fmt;

/// Header line written once at the top of the CSV telemetry stream.
pub const CSV_HEADER: &str = "ADC1_0,ADC1_1,ADC1_2,ADC2_0";

/// The latest value of every channel at one point in time.
///
/// Formats as one CSV row in [`CSV_HEADER`] column order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub adc1_0: i64,
    pub adc1_1: i64,
    pub adc1_2: i64,
    pub adc2_0: i64,
}

impl Snapshot {
    /// Channel values in column order.
    pub fn channels(&self) -> [i64; 4] {
        [self.adc1_0, self.adc1_1, self.adc1_2, self.adc2_0]
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.channels();
        write!(f, "{a},{b},{c},{d}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_zero() {
        assert_eq!(Snapshot::default().channels(), [0, 0, 0, 0]);
        assert_eq!(Snapshot::default().to_string(), "0,0,0,0");
    }

    #[test]
    fn csv_row_follows_header_order() {
        let snapshot = Snapshot {
            adc1_0: 10,
            adc1_1: 20,
            adc1_2: 30,
            adc2_0: -5,
        };
        assert_eq!(snapshot.to_string(), "10,20,30,-5");
        assert_eq!(CSV_HEADER.split(',').count(), snapshot.channels().len());
    }
}
