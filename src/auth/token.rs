//! The session token stored in the encrypted auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

mod expiry_format {
    //! Serializes the token expiry with an explicit format.
    //!
    //! The `Display` output of [time::OffsetDateTime] writes midnight with a
    //! single digit hour, which its own parser then rejects.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2025-03-01 00:00:00.0 +05:00:00".
    const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(expires_at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = expires_at
            .format(EXPIRY_FORMAT)
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;

        OffsetDateTime::parse(&text, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies a logged in user until `expires_at`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}
