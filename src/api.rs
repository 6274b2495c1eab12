//! Public API surface for the backend.
//!
//! This file consolidates the identifier newtypes shared across the
//! repository, service, and HTTP layers. All types derive
//! Serialize/Deserialize for JSON serialization.

pub use crate::models::ladies_day::{LadiesDay, SourceType, Vote, VoteType};
pub use crate::models::review::{Review, ReviewVisibility};
pub use crate::models::sauna::{Facility, FacilityCategory, Sauna};
pub use crate::models::user::User;

use serde::{Deserialize, Serialize};

/// User identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Sauna identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SaunaId(pub i64);

/// Facility identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacilityId(pub i64);

/// Ladies-day schedule entry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LadiesDayId(pub i64);

/// Review identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        UserId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl SaunaId {
    pub fn new(value: i64) -> Self {
        SaunaId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FacilityId {
    pub fn new(value: i64) -> Self {
        FacilityId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl LadiesDayId {
    pub fn new(value: i64) -> Self {
        LadiesDayId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ReviewId {
    pub fn new(value: i64) -> Self {
        ReviewId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SaunaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for FacilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for LadiesDayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}
impl From<SaunaId> for i64 {
    fn from(id: SaunaId) -> Self {
        id.0
    }
}
impl From<LadiesDayId> for i64 {
    fn from(id: LadiesDayId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        assert_eq!(UserId::new(7).value(), 7);
        assert_eq!(SaunaId::new(42).value(), 42);
        assert_eq!(LadiesDayId::new(-1).value(), -1);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(LadiesDayId::new(123).to_string(), "123");
        assert_eq!(ReviewId::new(9).to_string(), "9");
    }
}
