// ==========================================
// 瓶装产线排产系统 - 时间戳工具
// ==========================================
// 存储格式: RFC 3339 UTC, 毫秒精度 (字典序即时间序)
// ==========================================

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// 当前时间（截断到毫秒，与存储精度一致）
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// 格式化为存储字符串
pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 解析存储字符串
pub fn parse_ts(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s.trim()).map(|dt| dt.with_timezone(&Utc))
}

/// 小时数转换为毫秒精度的时长；超出 chrono 可表示范围时返回 None
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

/// serde: DateTime<Utc> <-> RFC 3339 毫秒字符串
pub mod serde_millis {
    use super::{format_ts, parse_ts};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_ts(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_ts(&raw).map_err(serde::de::Error::custom)
    }
}

/// serde: Option<DateTime<Utc>>，None 序列化为 null
pub mod serde_millis_opt {
    use super::{format_ts, parse_ts};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&format_ts(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| parse_ts(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
