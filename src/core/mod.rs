pub mod config;
pub mod events;
pub mod table;

pub use self::config::PhysicsParams;
pub use self::events::{BallSnapshot, Collision};
pub use self::table::{Table, TableData};

use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A unique identifier for a ball on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BallId(pub u32);

/// A unique identifier for a cushion segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CushionId(pub u32);

/// A unique identifier for a pocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PocketId(pub u32);

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ball#{}", self.0)
    }
}

impl fmt::Display for CushionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cushion#{}", self.0)
    }
}

impl fmt::Display for PocketId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pocket#{}", self.0)
    }
}
