//! Search parameter models

use crate::error::{Error, Result};
use crate::query::{Arguments, FilterValue, Filters, QueryBuilder};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key reserved for the list of fields to return
pub const RETURN_FIELDS_KEY: &str = "return_fields";
/// Key reserved for passthrough request arguments
pub const ARGUMENTS_KEY: &str = "arguments";

/// Everything about a search except the free-text query.
///
/// When read from a JSON or YAML map, `return_fields` and `arguments` are
/// reserved; every other key is a filter on the field of that name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOptions {
    pub filters: Filters,
    pub return_fields: Vec<String>,
    pub arguments: Arguments,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter on `field`
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(field, value);
        self
    }

    /// Fields to request for each hit
    pub fn return_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Add a passthrough request argument (e.g. faceting controls)
    pub fn argument(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.arguments.insert(name, value);
        self
    }
}

impl<'de> Deserialize<'de> for SearchOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = SearchOptions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of filters, return_fields and arguments")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<SearchOptions, A::Error> {
                let mut options = SearchOptions::default();
                while let Some(key) = access.next_key::<String>()? {
                    match key.as_str() {
                        RETURN_FIELDS_KEY => options.return_fields = access.next_value()?,
                        ARGUMENTS_KEY => options.arguments = access.next_value()?,
                        _ => {
                            let value: FilterValue = access.next_value()?;
                            options.filters.insert(key, value);
                        }
                    }
                }
                Ok(options)
            }
        }

        deserializer.deserialize_map(OptionsVisitor)
    }
}

/// Validated input to a single search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParameters {
    /// Free-text query; `None` means a filter-only boolean query
    pub query: Option<String>,
    pub filters: Filters,
    pub return_fields: Vec<String>,
    pub arguments: Arguments,
}

impl SearchParameters {
    /// Free-text search, optionally narrowed by filters
    pub fn from_query(query: impl Into<String>, options: SearchOptions) -> Result<Self> {
        let query = query.into();
        let query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        Self::build(query, options)
    }

    /// Filter-only search
    pub fn from_filters(options: SearchOptions) -> Result<Self> {
        Self::build(None, options)
    }

    fn build(query: Option<String>, options: SearchOptions) -> Result<Self> {
        let params = Self {
            query,
            filters: options.filters,
            return_fields: options.return_fields,
            arguments: options.arguments,
        };
        params.validate()?;
        Ok(params)
    }

    /// A search needs query text or at least one filter clause
    pub fn validate(&self) -> Result<()> {
        if self.query.is_none() && self.filters.clause_count() == 0 {
            return Err(Error::InvalidQuery);
        }
        Ok(())
    }

    pub fn query_builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self.query.as_deref(), &self.filters)
            .return_fields(&self.return_fields)
            .arguments(&self.arguments)
    }
}
