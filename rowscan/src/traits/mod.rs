//! Core traits for rowscan

mod from_value;
mod mappable;
mod row;

pub use from_value::FromValue;
#[doc(hidden)]
pub use mappable::replace_from_any;
pub use mappable::{
    MapOutput, MapValues, Mappable, PointerSlot, RecordSlot, Scanner, Slot, ValueSlot,
};
pub use row::{Row, RowExt};
