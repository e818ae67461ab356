use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Backend deployment selector.
///
/// The set of tags is open: anything the console does not recognise is kept
/// verbatim in [`Environment::Other`] and routed to the live deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    #[default]
    Live,
    Test,
    Local,
    Dev,
    Other(String),
}

/// The two backend deployments an environment tag can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    Live,
    Test,
}

impl Environment {
    /// Take a raw tag as given. Only the four known tags are recognised, and
    /// they match exactly; anything else, case or padding included, is kept
    /// in [`Environment::Other`]. Returns `None` only for the empty string so
    /// callers can fall through to the next source.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.is_empty() {
            return None;
        }
        Some(match tag {
            "live" => Environment::Live,
            "test" => Environment::Test,
            "local" => Environment::Local,
            "dev" => Environment::Dev,
            other => Environment::Other(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Live => "live",
            Environment::Test => "test",
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Other(tag) => tag,
        }
    }

    /// `test`, `local` and `dev` target the test deployment; everything else is live.
    pub fn deployment(&self) -> Deployment {
        match self {
            Environment::Test | Environment::Local | Environment::Dev => Deployment::Test,
            Environment::Live | Environment::Other(_) => Deployment::Live,
        }
    }

    pub fn is_test_like(&self) -> bool {
        self.deployment() == Deployment::Test
    }
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Environment::from_tag(s).unwrap_or_default())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deployment::Live => f.write_str("live"),
            Deployment::Test => f.write_str("test"),
        }
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Environment::from_tag(&tag).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("live", Environment::Live ; "live tag")]
    #[test_case("test", Environment::Test ; "test tag")]
    #[test_case("local", Environment::Local ; "local tag")]
    #[test_case("dev", Environment::Dev ; "dev tag")]
    #[test_case("TEST", Environment::Other("TEST".to_string()) ; "upper case is not test")]
    #[test_case(" local ", Environment::Other(" local ".to_string()) ; "padding is kept")]
    #[test_case(" ", Environment::Other(" ".to_string()) ; "whitespace only")]
    #[test_case("staging", Environment::Other("staging".to_string()) ; "unknown tag")]
    fn test_from_tag(raw: &str, expected: Environment) {
        assert_eq!(Environment::from_tag(raw), Some(expected));
    }

    #[test]
    fn test_empty_tag_is_absent() {
        assert_eq!(Environment::from_tag(""), None);
    }

    #[test_case(Environment::Test, Deployment::Test)]
    #[test_case(Environment::Local, Deployment::Test)]
    #[test_case(Environment::Dev, Deployment::Test)]
    #[test_case(Environment::Live, Deployment::Live)]
    #[test_case(Environment::Other("staging".to_string()), Deployment::Live)]
    #[test_case(Environment::Other("TEST".to_string()), Deployment::Live)]
    fn test_deployment_classification(env: Environment, expected: Deployment) {
        assert_eq!(env.deployment(), expected);
    }

    #[test]
    fn test_display_keeps_unknown_tag_text() {
        let env: Environment = "Preview-42".parse().unwrap();
        assert_eq!(env.to_string(), "Preview-42");
        assert_eq!(Environment::Dev.to_string(), "dev");
    }

    #[test]
    fn test_serde_uses_plain_tag() {
        let json = serde_json::to_string(&Environment::Local).unwrap();
        assert_eq!(json, "\"local\"");

        let parsed: Environment = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(parsed, Environment::Test);

        let blank: Environment = serde_json::from_str("\"\"").unwrap();
        assert_eq!(blank, Environment::Live);
    }
}
