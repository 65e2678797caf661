// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Direction of a port as seen from the block that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    Bidir,
}

impl Direction {
    /// Returns the direction seen from the other side of a connection.
    /// `Bidir` stays `Bidir`.
    pub fn mirror(&self) -> Direction {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
            Direction::Bidir => Direction::Bidir,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Bidir => "bidir",
        };
        write!(f, "{s}")
    }
}

/// Electrical shape of a port: a lone wire or a bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Bit,
    BitVector,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_swaps_in_and_out() {
        assert_eq!(Direction::In.mirror(), Direction::Out);
        assert_eq!(Direction::Out.mirror(), Direction::In);
        assert_eq!(Direction::Bidir.mirror(), Direction::Bidir);
    }
}
