use sensorlink_protocol::{Reading, Snapshot};

/// Latest known value of every channel.
///
/// All channels start at zero. A reading only ever writes the channels owned
/// by its role; nothing else mutates them. Zero is also a valid reading, so a
/// channel that never received data is indistinguishable from one that read 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryState {
    adc1: [i64; 3],
    adc2: i64,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the channels owned by the reading's role.
    pub fn apply(&mut self, reading: &Reading) {
        match *reading {
            Reading::ThreeChannel(values) => self.adc1 = values,
            Reading::OneChannel(value) => self.adc2 = value,
        }
    }

    /// Copy of the current channel values.
    pub fn snapshot(&self) -> Snapshot {
        let [adc1_0, adc1_1, adc1_2] = self.adc1;
        Snapshot {
            adc1_0,
            adc1_1,
            adc1_2,
            adc2_0: self.adc2,
        }
    }
}
