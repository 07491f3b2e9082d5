//! MySQL value decoding

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mysql_async::Value as MySqlValue;

/// Convert a mysql_async value into a [`Value`].
///
/// Text results arrive as bytes and become strings when they are valid
/// UTF-8. A `DATE`/`DATETIME` with a zero time part becomes [`Value::Date`].
pub fn from_mysql_value(value: MySqlValue) -> Result<Value> {
    Ok(match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        MySqlValue::Int(v) => Value::I64(v),
        MySqlValue::UInt(v) => Value::U64(v),
        MySqlValue::Float(v) => Value::F32(v),
        MySqlValue::Double(v) => Value::F64(v),
        MySqlValue::Date(year, month, day, 0, 0, 0, 0) => Value::Date(date(year, month, day)?),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => Value::DateTime(
            NaiveDateTime::new(date(year, month, day)?, time(hour, min, sec, micro)?),
        ),
        // NaiveTime covers a single day only
        MySqlValue::Time(negative, days, hours, mins, secs, micro) => {
            if negative || days > 0 || hours >= 24 {
                return Err(Error::TypeConversion {
                    expected: "time (00:00:00 to 23:59:59)",
                    actual: format!(
                        "{}{}:{:02}:{:02}",
                        if negative { "-" } else { "" },
                        days * 24 + hours as u32,
                        mins,
                        secs
                    ),
                });
            }
            Value::Time(time(hours, mins, secs, micro)?)
        }
    })
}

fn date(year: u16, month: u8, day: u8) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year.into(), month.into(), day.into()).ok_or_else(|| {
        Error::TypeConversion {
            expected: "date",
            actual: format!("{}-{}-{}", year, month, day),
        }
    })
}

fn time(hour: u8, min: u8, sec: u8, micro: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_micro_opt(hour.into(), min.into(), sec.into(), micro).ok_or_else(|| {
        Error::TypeConversion {
            expected: "time",
            actual: format!("{}:{}:{}.{}", hour, min, sec, micro),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_binary() {
        assert_eq!(
            from_mysql_value(MySqlValue::Bytes(b"abc".to_vec())).unwrap(),
            Value::String("abc".to_string())
        );
        assert_eq!(
            from_mysql_value(MySqlValue::Bytes(vec![0xff, 0x00])).unwrap(),
            Value::Bytes(vec![0xff, 0x00])
        );
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            from_mysql_value(MySqlValue::Date(2024, 5, 17, 0, 0, 0, 0)).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
        );
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_micro_opt(8, 30, 0, 250)
            .unwrap();
        assert_eq!(
            from_mysql_value(MySqlValue::Date(2024, 5, 17, 8, 30, 0, 250)).unwrap(),
            Value::DateTime(expected)
        );
        assert!(from_mysql_value(MySqlValue::Date(2024, 13, 1, 0, 0, 0, 0)).is_err());
    }

    #[test]
    fn test_time_out_of_range() {
        assert!(from_mysql_value(MySqlValue::Time(true, 0, 1, 0, 0, 0)).is_err());
        assert!(from_mysql_value(MySqlValue::Time(false, 1, 0, 0, 0, 0)).is_err());
        assert_eq!(
            from_mysql_value(MySqlValue::Time(false, 0, 23, 59, 59, 0)).unwrap(),
            Value::Time(NaiveTime::from_hms_opt(23, 59, 59).unwrap())
        );
    }
}
