use std::fmt::{Formatter, Result as FmtResult};

use serde::{
    de::{Deserializer, Error as DeError, Visitor},
    ser::Serializer,
    Deserialize, Serialize,
};

use crate::status::Status;

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StatusVisitor;

        impl Visitor<'_> for StatusVisitor {
            type Value = Status;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
                formatter.write_str("a canonical status name")
            }

            fn visit_str<E>(self, name: &str) -> Result<Status, E>
            where
                E: DeError,
            {
                name.parse().map_err(DeError::custom)
            }
        }

        deserializer.deserialize_str(StatusVisitor)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_serializes_as_its_canonical_name() {
        let json = serde_json::to_string(&Status::Rfc5321Tld).unwrap();
        assert_eq!(json, "\"RFC5321_TLD\"");
        let status: Status = serde_json::from_str("\"ERR_CONSECUTIVEDOTS\"").unwrap();
        assert_eq!(status, Status::ErrConsecutiveDots);
        assert!(serde_json::from_str::<Status>("\"NOT_A_STATUS\"").is_err());
    }
}
