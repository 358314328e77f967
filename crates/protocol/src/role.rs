use std::fmt;

/// Identity of a known transmitter, bound to one network address by config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderRole {
    /// Sends `"<int>,<int>,<int>"`; owns `ADC1_0`, `ADC1_1` and `ADC1_2`.
    ThreeChannel,
    /// Sends `"<int>"`; owns `ADC2_0`.
    OneChannel,
}

impl SenderRole {
    /// Number of integer fields this role's payload carries.
    pub fn field_count(self) -> usize {
        match self {
            SenderRole::ThreeChannel => 3,
            SenderRole::OneChannel => 1,
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderRole::ThreeChannel => write!(f, "three-channel"),
            SenderRole::OneChannel => write!(f, "one-channel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_counts() {
        assert_eq!(SenderRole::ThreeChannel.field_count(), 3);
        assert_eq!(SenderRole::OneChannel.field_count(), 1);
    }

    #[test]
    fn display_names() {
        assert_eq!(SenderRole::ThreeChannel.to_string(), "three-channel");
        assert_eq!(SenderRole::OneChannel.to_string(), "one-channel");
    }
}
