use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::de::Error;

type InnerSnowflake = snowcloud::Snowflake<43, 8, 12>;

/// Id of every stored entity. Kept as the raw integer so it can be copied,
/// hashed and compared freely; serialized as a string so JS clients don't
/// lose precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake(i64);

impl Snowflake {
    pub fn id(&self) -> i64 {
        self.0
    }

    /// Wrap an id read back from the database. Those were produced by the
    /// generator so they aren't validated again.
    pub(crate) fn from_db(id: i64) -> Self {
        Snowflake(id)
    }
}

impl TryFrom<i64> for Snowflake {
    type Error = snowcloud::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(InnerSnowflake::try_from(value)?.into())
    }
}

impl From<InnerSnowflake> for Snowflake {
    fn from(value: InnerSnowflake) -> Self {
        Snowflake(value.id())
    }
}

impl FromStr for Snowflake {
    type Err = Box<dyn std::error::Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s.parse::<i64>()?;
        Ok(Snowflake::try_from(num)?)
    }
}

impl Display for Snowflake {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Snowflake {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_string().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Snowflake {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let num = String::deserialize(deserializer)?;
        Snowflake::from_str(&num).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_string() {
        let id = Snowflake::from_db(1234567890123);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234567890123\"");
    }

    #[test]
    fn rejects_garbage() {
        assert!("pin".parse::<Snowflake>().is_err());
        assert!(serde_json::from_str::<Snowflake>("\"12ab\"").is_err());
    }
}
