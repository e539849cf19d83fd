//! The session token stored inside the private auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

mod expiry_format {
    //! Serializes the token expiry with zero padded hours.
    //!
    //! The default [time::OffsetDateTime] serializer writes midnight as
    //! "0:00:00.0", which the default deserializer then refuses to parse.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2026-03-01 00:00:00.0 +00:00:00".
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

/// Identifies the logged in user and when their session ends.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `user_id` that expires `duration` from now (UTC).
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidToken] if the expiry overflows the date range.
    pub fn new(user_id: UserID, duration: Duration) -> Result<Self, Error> {
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(duration)
            .ok_or_else(|| Error::InvalidToken(format!("expiry overflowed for {duration}")))?;

        Ok(Self {
            user_id,
            expires_at,
        })
    }

    /// Whether the session has ended at `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime, UtcOffset, macros::datetime};

    use crate::auth::UserID;

    use super::Token;

    #[test]
    fn token_json_uses_padded_expiry() {
        let token = Token {
            user_id: UserID::new(3),
            expires_at: datetime!(2026-03-01 09:15:00).assume_offset(UtcOffset::UTC),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert_eq!(
            json,
            r#"{"user_id":3,"expires_at":"2026-03-01 09:15:00.0 +00:00:00"}"#
        );
    }

    #[test]
    fn token_with_midnight_expiry_reads_back() {
        let json = r#"{"user_id":3,"expires_at":"2026-03-01 00:00:00.0 +00:00:00"}"#;

        let token: Token = serde_json::from_str(json).unwrap();

        assert_eq!(token.user_id, UserID::new(3));
        assert_eq!(
            token.expires_at,
            datetime!(2026-03-01 00:00:00).assume_offset(UtcOffset::UTC)
        );
    }

    #[test]
    fn new_token_expires_after_duration() {
        let token = Token::new(UserID::new(1), Duration::minutes(5)).unwrap();
        let now = OffsetDateTime::now_utc();

        assert!(!token.is_expired_at(now));
        assert!(token.is_expired_at(now + Duration::minutes(6)));
    }

    #[test]
    fn new_token_rejects_overflowing_duration() {
        assert!(Token::new(UserID::new(1), Duration::MAX).is_err());
    }
}
