//! The verbs a [`Route`](crate::Route) can be declared with.
//!
//! Requests carrying any other verb never reach route lookup; the router
//! answers them with `405`.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Patch,
    Post,
}

const TABLE: [(Method, &str); 4] = [
    (Method::Delete, "DELETE"),
    (Method::Get, "GET"),
    (Method::Patch, "PATCH"),
    (Method::Post, "POST"),
];

impl Method {
    pub const ALL: [Method; 4] = [Method::Delete, Method::Get, Method::Patch, Method::Post];

    pub fn as_str(self) -> &'static str {
        TABLE[self as usize].1
    }
}

/// Method tokens are case-sensitive, so `"get"` does not parse.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TABLE
            .iter()
            .find(|(_, token)| *token == s)
            .map(|(method, _)| *method)
            .ok_or(())
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = ();

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_routable_verbs_only() {
        assert_eq!("PATCH".parse::<Method>(), Ok(Method::Patch));
        assert_eq!(Method::try_from(&http::Method::DELETE), Ok(Method::Delete));
        assert!("get".parse::<Method>().is_err());
        assert!(Method::try_from(&http::Method::PUT).is_err());
    }

    #[test]
    fn table_order_matches_discriminants() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>(), Ok(method));
        }
    }
}
