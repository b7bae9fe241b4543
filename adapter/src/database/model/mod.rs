pub mod booking;
pub mod room;
pub mod user;

use shared::error::AppError;
use std::str::FromStr;

// DB に文字列で保存している列挙値をドメインの型へ変換する
pub(crate) fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::ConversionEntityError(format!("invalid {column}: {value}")))
}
