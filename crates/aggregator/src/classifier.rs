use std::net::IpAddr;

use sensorlink_protocol::SenderRole;

/// Maps a sender's IP address to its configured role.
///
/// Matching is exact on the address; the source port is ignored. Addresses
/// outside the configured pair classify as `None` and their datagrams are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    three_channel: IpAddr,
    one_channel: IpAddr,
}

impl Classifier {
    pub fn new(three_channel: IpAddr, one_channel: IpAddr) -> Self {
        Self {
            three_channel,
            one_channel,
        }
    }

    /// Returns the role bound to `addr`, or `None` for an unknown sender.
    pub fn classify(&self, addr: IpAddr) -> Option<SenderRole> {
        if addr == self.three_channel {
            Some(SenderRole::ThreeChannel)
        } else if addr == self.one_channel {
            Some(SenderRole::OneChannel)
        } else {
            None
        }
    }

    /// The address bound to `role`.
    pub fn address(&self, role: SenderRole) -> IpAddr {
        match role {
            SenderRole::ThreeChannel => self.three_channel,
            SenderRole::OneChannel => self.one_channel,
        }
    }
}
