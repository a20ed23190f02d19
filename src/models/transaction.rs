use serde::{Deserialize, Serialize};

use crate::models::Address;

/// Direction of a transaction relative to the address it is recorded against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// Classify a transfer from the point of view of `address`.
    ///
    /// A transaction sent by `address` is outgoing even if it also lands on
    /// `address`. Returns `None` when `address` is on neither side.
    pub fn classify(address: &Address, from: &Address, to: &Address) -> Option<Direction> {
        if from == address {
            Some(Direction::Outgoing)
        } else if to == address {
            Some(Direction::Incoming)
        } else {
            None
        }
    }

    pub fn is_incoming(self) -> bool {
        self == Direction::Incoming
    }
}

/// A transaction recorded against a subscribed address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub hash: String,
    pub from: Address,
    pub to: Address,
    /// Decimal string; never interpreted by the engine
    pub value: String,
    pub direction: Direction,
}

impl Transaction {
    pub fn is_incoming(&self) -> bool {
        self.direction.is_incoming()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_classification() {
        let me = Address::new("0xTestAddress");
        let other = Address::new("0xother");

        assert_eq!(
            Direction::classify(&me, &Address::new("0xTESTADDRESS"), &other),
            Some(Direction::Outgoing)
        );
        assert_eq!(
            Direction::classify(&me, &other, &Address::new(" 0xtestaddress")),
            Some(Direction::Incoming)
        );
        assert_eq!(Direction::classify(&me, &other, &Address::new("0xthird")), None);
    }

    #[test]
    fn test_self_transfer_is_outgoing() {
        let me = Address::new("0xme");
        assert_eq!(Direction::classify(&me, &me, &me), Some(Direction::Outgoing));
    }

    #[test]
    fn test_transaction_serialization() {
        let tx = Transaction {
            hash: "0x1".to_string(),
            from: Address::new("0xFrom1"),
            to: Address::new("0xto1"),
            value: "100".to_string(),
            direction: Direction::Incoming,
        };

        let json = serde_json::to_string(&tx).expect("Failed to serialize");
        assert!(json.contains("\"from\":\"0xfrom1\""));
        assert!(json.contains("\"direction\":\"Incoming\""));
        assert!(tx.is_incoming());
    }
}
