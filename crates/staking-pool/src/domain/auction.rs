//! Values read from the external fee auction.

use {
    primitive_types::{H160, U256},
    std::{fmt, str::FromStr},
};

/// The 7 byte payload attached to an auction bid. The swap fee occupies the
/// three most significant bytes as a big endian unsigned integer.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Payload(pub [u8; 7]);

impl Payload {
    pub const MAX_SWAP_FEE: u32 = (1 << 24) - 1;

    /// Builds a payload carrying `swap_fee` with the remaining bytes zeroed.
    /// Returns `None` if the fee does not fit into 24 bits.
    pub fn with_swap_fee(swap_fee: u32) -> Option<Self> {
        if swap_fee > Self::MAX_SWAP_FEE {
            return None;
        }
        let [_, b0, b1, b2] = swap_fee.to_be_bytes();
        Some(Self([b0, b1, b2, 0, 0, 0, 0]))
    }

    pub fn swap_fee(&self) -> u32 {
        u32::from_be_bytes([0, self.0[0], self.0[1], self.0[2]])
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidPayload {
    #[error("payload is not valid hex")]
    Hex(#[from] hex::FromHexError),
    #[error("payload must be 7 bytes, got {0}")]
    Length(usize),
}

impl FromStr for Payload {
    type Err = InvalidPayload;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        let len = bytes.len();
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| InvalidPayload::Length(len))
    }
}

/// The currently winning bid of the fee auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bid {
    pub bidder: H160,
    /// Rent paid per epoch by the bidder. Informational only.
    pub rent: U256,
    pub payload: Payload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_fee_is_read_from_the_top_three_bytes() {
        let payload = Payload([0x00, 0x01, 0xf4, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(payload.swap_fee(), 500);

        let payload = Payload([0xff, 0xff, 0xff, 0, 0, 0, 0]);
        assert_eq!(payload.swap_fee(), Payload::MAX_SWAP_FEE);
    }

    #[test]
    fn builds_payloads_from_fees() {
        assert_eq!(
            Payload::with_swap_fee(250).unwrap(),
            Payload([0, 0, 250, 0, 0, 0, 0])
        );
        assert_eq!(Payload::with_swap_fee(250).unwrap().swap_fee(), 250);
        assert!(Payload::with_swap_fee(1 << 24).is_none());
    }

    #[test]
    fn parses_hex() {
        let payload: Payload = "0x0001f400000000".parse().unwrap();
        assert_eq!(payload.swap_fee(), 500);
        assert_eq!(format!("{payload:?}"), "0x0001f400000000");

        assert!(matches!(
            "0x0001f4".parse::<Payload>(),
            Err(InvalidPayload::Length(3))
        ));
        assert!(matches!(
            "0xzz01f400000000".parse::<Payload>(),
            Err(InvalidPayload::Hex(_))
        ));
    }
}
