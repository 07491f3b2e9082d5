//! FromValue trait for coercing column values into Rust types

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Trait for types that can be constructed from a column value.
///
/// This is the coercion step of the row accessor: the materializer fetches a
/// [`Value`] for a column and the destination leaf converts it with this
/// trait. Implement it for custom types (e.g., enums) and register them as
/// leaves with [`impl_leaf!`](crate::impl_leaf).
pub trait FromValue: Sized {
    /// Convert a column value to this type.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    Error::TypeConversion {
        expected,
        actual: value.type_name().to_string(),
    }
}

// Every integer variant is accepted; narrowing is range checked because
// drivers tend to hand back i64/u64 regardless of the column width.
macro_rules! int_from_value {
    ($($ty:ident),+ $(,)?) => {
        $(impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                fn narrow<S: Copy + std::fmt::Display>(
                    v: S,
                    source: &str,
                ) -> Result<$ty>
                where
                    $ty: TryFrom<S>,
                {
                    <$ty>::try_from(v).map_err(|_| Error::TypeConversion {
                        expected: stringify!($ty),
                        actual: format!("{}({}) out of range", source, v),
                    })
                }

                match value {
                    Value::I8(v) => narrow(v, "i8"),
                    Value::I16(v) => narrow(v, "i16"),
                    Value::I32(v) => narrow(v, "i32"),
                    Value::I64(v) => narrow(v, "i64"),
                    Value::U8(v) => narrow(v, "u8"),
                    Value::U16(v) => narrow(v, "u16"),
                    Value::U32(v) => narrow(v, "u32"),
                    Value::U64(v) => narrow(v, "u64"),
                    other => Err(mismatch(stringify!($ty), &other)),
                }
            }
        })+
    };
}

int_from_value!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::I8(v) => Ok(v != 0),
            Value::I16(v) => Ok(v != 0),
            Value::I32(v) => Ok(v != 0),
            Value::I64(v) => Ok(v != 0),
            Value::U8(v) => Ok(v != 0),
            Value::U16(v) => Ok(v != 0),
            Value::U32(v) => Ok(v != 0),
            Value::U64(v) => Ok(v != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v),
            Value::F64(v) => Ok(v as f32),
            other => Err(mismatch("f32", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F32(v) => Ok(v as f64),
            Value::F64(v) => Ok(v),
            Value::Decimal(v) => v.to_string().parse().map_err(|_| Error::TypeConversion {
                expected: "f64",
                actual: format!("decimal({}) not representable", v),
            }),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|e| Error::TypeConversion {
                expected: "utf8 string",
                actual: format!("invalid utf8: {}", e),
            }),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::String(v) => Ok(v.into_bytes()),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => Ok(v.and_time(NaiveTime::MIN)),
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(v) => Ok(v),
            Value::DateTime(v) => Ok(v.time()),
            other => Err(mismatch("time", &other)),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::I64(v) => Ok(Decimal::from(v)),
            Value::U64(v) => Ok(Decimal::from(v)),
            Value::String(v) => v.parse().map_err(|_| Error::TypeConversion {
                expected: "decimal",
                actual: format!("invalid decimal string: {}", v),
            }),
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            Value::String(v) => serde_json::from_str(&v).map_err(|e| Error::TypeConversion {
                expected: "json",
                actual: format!("invalid json: {}", e),
            }),
            other => Err(mismatch("json", &other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(value)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(i32::from_value(Value::I64(7)).unwrap(), 7);
        assert_eq!(u16::from_value(Value::I64(65535)).unwrap(), 65535);
        assert!(matches!(
            i8::from_value(Value::I64(300)),
            Err(Error::TypeConversion { expected: "i8", .. })
        ));
        assert!(u64::from_value(Value::I64(-1)).is_err());
    }

    #[test]
    fn test_mismatch_reports_actual_type() {
        let err = i64::from_value(Value::String("x".into())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type conversion error: expected i64, got string"
        );
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::I32(3)).unwrap(), Some(3));
    }

    #[test]
    fn test_date_to_datetime() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let dt = NaiveDateTime::from_value(Value::Date(date)).unwrap();
        assert_eq!(dt.date(), date);
        assert_eq!(dt.time(), NaiveTime::MIN);
    }
}
