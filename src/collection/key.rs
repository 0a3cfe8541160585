//! Group keys of a [`TrajectoryCollection`](crate::collection::TrajectoryCollection).
//!
//! A [`GroupKey`] holds one [`KeyValue`] per grouping column (or a single value
//! when grouping by the row index). Keys are hashable and totally ordered so a
//! collection can both look groups up and optionally sort them.
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use hifitime::Epoch;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;

/// One component of a group key.
#[derive(Debug, Clone)]
pub enum KeyValue {
    /// Missing value, only produced when missing keys are kept.
    Null,
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
    Time(Epoch),
}

impl KeyValue {
    fn rank(&self) -> u8 {
        match self {
            KeyValue::Null => 0,
            KeyValue::Int(_) => 1,
            KeyValue::Float(_) => 2,
            KeyValue::Text(_) => 3,
            KeyValue::Time(_) => 4,
        }
    }

    fn time_nanos(epoch: &Epoch) -> i128 {
        epoch.to_tai_duration().total_nanoseconds()
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyValue {}

impl Ord for KeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyValue::Null, KeyValue::Null) => Ordering::Equal,
            (KeyValue::Int(a), KeyValue::Int(b)) => a.cmp(b),
            (KeyValue::Float(a), KeyValue::Float(b)) => a.cmp(b),
            (KeyValue::Text(a), KeyValue::Text(b)) => a.cmp(b),
            (KeyValue::Time(a), KeyValue::Time(b)) => {
                Self::time_nanos(a).cmp(&Self::time_nanos(b))
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            KeyValue::Null => {}
            KeyValue::Int(v) => v.hash(state),
            KeyValue::Float(v) => v.hash(state),
            KeyValue::Text(v) => v.hash(state),
            KeyValue::Time(v) => Self::time_nanos(v).hash(state),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Null => write!(f, "NaN"),
            KeyValue::Int(v) => write!(f, "{v}"),
            KeyValue::Float(v) => write!(f, "{v}"),
            KeyValue::Text(v) => write!(f, "{v}"),
            KeyValue::Time(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        KeyValue::Int(v)
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        KeyValue::Float(OrderedFloat(v))
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        KeyValue::Text(v.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        KeyValue::Text(v)
    }
}

impl From<Epoch> for KeyValue {
    fn from(v: Epoch) -> Self {
        KeyValue::Time(v)
    }
}

/// Identifier of one group of a collection: one value per key column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(pub SmallVec<[KeyValue; 2]>);

impl GroupKey {
    pub fn values(&self) -> &[KeyValue] {
        &self.0
    }

    /// The single value of a one-column key.
    pub fn single(&self) -> Option<&KeyValue> {
        match self.0.as_slice() {
            [v] => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [v] => write!(f, "{v}"),
            values => {
                write!(f, "(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<KeyValue> for GroupKey {
    fn from(v: KeyValue) -> Self {
        GroupKey(smallvec::smallvec![v])
    }
}

macro_rules! group_key_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for GroupKey {
                fn from(v: $t) -> Self {
                    GroupKey::from(KeyValue::from(v))
                }
            }
        )*
    };
}

group_key_from_scalar!(i64, f64, &str, String, Epoch);

impl From<Vec<KeyValue>> for GroupKey {
    fn from(v: Vec<KeyValue>) -> Self {
        GroupKey(SmallVec::from_vec(v))
    }
}

#[cfg(test)]
mod test_key {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(GroupKey::from("A").to_string(), "A");
        let key = GroupKey::from(vec![KeyValue::from("A"), KeyValue::from(3_i64)]);
        assert_eq!(key.to_string(), "(A, 3)");
    }

    #[test]
    fn test_ordering_is_total() {
        let mut keys = vec![
            GroupKey::from("b"),
            GroupKey::from(2_i64),
            GroupKey::from("a"),
            GroupKey::from(1_i64),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["1", "2", "a", "b"]);
    }
}
