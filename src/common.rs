use std::time::Duration;

use pnet::packet::icmp::IcmpTypes;
use serde::{Deserialize, Serialize};

use crate::checksum::checksum;

pub const ICMP_ECHO_REQUEST: u8 = IcmpTypes::EchoRequest.0;
pub const ICMP_ECHO_REPLY: u8 = IcmpTypes::EchoReply.0;

/// Every probe goes out with the same sequence number.
pub const SEQUENCE_NUMBER: u16 = 1;

pub const ICMP_HEADER_LEN: usize = 8;
pub const TIMESTAMP_LEN: usize = 8;
pub const PADDING_LEN: usize = 48;
pub const PAYLOAD_LEN: usize = TIMESTAMP_LEN + PADDING_LEN;
pub const PACKET_LEN: usize = ICMP_HEADER_LEN + PAYLOAD_LEN;

/// Replies are read with the IPv4 header in front; options are not expected.
pub const IPV4_HEADER_LEN: usize = 20;
pub const RECV_BUFFER_LEN: usize = 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_COUNT: u32 = 4;

/// The 8-byte ICMP echo header. Encoded with bincode, so multi-byte fields
/// go out little-endian.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoHeader {
    pub icmp_type: u8,
    pub icmp_code: u8,
    pub icmp_chksum: u16,
    pub icmp_identifier: u16,
    pub icmp_seq_number: u16,
}

/// Header plus the send timestamp that starts the payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EchoRequest {
    pub header: EchoHeader,
    pub sent_at: f64,
}

impl EchoRequest {
    pub fn new(identifier: u16, sent_at: f64) -> Self {
        EchoRequest {
            header: EchoHeader {
                icmp_type: ICMP_ECHO_REQUEST,
                icmp_code: 0,
                icmp_chksum: 0,
                icmp_identifier: identifier,
                icmp_seq_number: SEQUENCE_NUMBER,
            },
            sent_at,
        }
    }

    /// Encodes the full 64-byte message, filling in the checksum.
    ///
    /// The checksum is computed with the field zeroed and then stored so
    /// its wire bytes come out in network byte order.
    pub fn encode(&self) -> bincode::Result<Vec<u8>> {
        let mut unsigned = *self;
        unsigned.header.icmp_chksum = 0;
        let mut packet = Self::serialize_padded(&unsigned)?;

        unsigned.header.icmp_chksum = checksum(&packet).swap_bytes();
        packet = Self::serialize_padded(&unsigned)?;
        Ok(packet)
    }

    fn serialize_padded(request: &EchoRequest) -> bincode::Result<Vec<u8>> {
        let mut packet = Vec::with_capacity(PACKET_LEN);
        bincode::serialize_into(&mut packet, request)?;
        packet.resize(PACKET_LEN, 0);
        Ok(packet)
    }

    /// Decodes the header and timestamp of an ICMP message. Returns `None`
    /// when `message` is too short to hold both.
    pub fn decode(message: &[u8]) -> Option<EchoRequest> {
        let fixed = message.get(..ICMP_HEADER_LEN + TIMESTAMP_LEN)?;
        bincode::deserialize(fixed).ok()
    }
}
