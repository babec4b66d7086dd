// ==========================================
// 行映射辅助: 时间戳 / 枚举列解析
// ==========================================
// 解析失败统一转为 FromSqlConversionFailure, 由 RepositoryError 承接
// ==========================================

use crate::domain::timestamp::parse_ts;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Result as SqliteResult, Row};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("无法识别的取值: {0}")]
struct UnknownValue(String);

/// 读取非空时间戳列
pub(crate) fn ts_column(row: &Row, idx: usize) -> SqliteResult<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 读取可空时间戳列
pub(crate) fn opt_ts_column(row: &Row, idx: usize) -> SqliteResult<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        parse_ts(&s).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// 读取枚举列（按 db 字符串解析）
pub(crate) fn enum_column<T>(
    row: &Row,
    idx: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> SqliteResult<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(UnknownValue(raw)))
    })
}
