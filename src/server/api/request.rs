//! Path and query parameters shared by every endpoint.
use core::fmt;

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

/// Path of a collection route, e.g. `/snippets/` or `/snippets.json`.
#[derive(Deserialize, Debug)]
pub struct Collection {
    /// Format suffix, if the route has one.
    pub format: Option<String>,
}

/// Path of a single-record route, e.g. `/snippets/1/` or `/snippets/1.json`.
#[derive(Deserialize, Debug)]
pub struct Detail {
    /// Primary key of the record.
    pub pk: i64,
    /// Format suffix, if the route has one.
    pub format: Option<String>,
}

/// Query parameters understood by every endpoint.
///
/// A repeated key keeps its last value and unknown keys are ignored.
#[derive(Debug, Default)]
pub struct Params {
    /// Explicit format, overriding any suffix.
    pub format: Option<String>,
    /// 1-based page number, or `last`, on list endpoints.
    pub page: Option<String>,
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = Params;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("query parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Params, A::Error> {
                let mut params = Params::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "format" => params.format = Some(map.next_value()?),
                        "page" => params.page = Some(map.next_value()?),
                        _ => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(params)
            }
        }

        deserializer.deserialize_map(ParamsVisitor)
    }
}
