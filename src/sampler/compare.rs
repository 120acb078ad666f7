use std::cmp::Ordering;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increased,
    Decreased,
    Unchanged,
}

pub fn compare<T: Ord>(new: T, old: T) -> Trend {
    match new.cmp(&old) {
        Ordering::Greater => Trend::Increased,
        Ordering::Less => Trend::Decreased,
        Ordering::Equal => Trend::Unchanged,
    }
}
