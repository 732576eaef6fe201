//! Query construction module
//!
//! Turns a free-text query plus field filters into the query string sent to
//! the search service. Two modes exist:
//! - plain: `q=<query>` when there are no filters
//! - boolean: `bq=(and '<query>' field:'value' ...)` as soon as any filter is set
//!
//! Optional `return-fields` and passthrough arguments follow, in that order.

mod params;

pub use params::{Arguments, FilterValue, Filters};

pub(crate) use params::scalar_to_string;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left literal in encoded values. Everything else, including
/// space, `%`, `&`, `=`, `+` and `#`, is percent-encoded.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b':')
    .remove(b'@')
    .remove(b',')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b'$')
    .remove(b'[')
    .remove(b']');

/// Percent-encode a value for use in the request query string
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

/// How the query is expressed to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Free text only, sent as `q`
    Plain,
    /// Boolean expression over filters, sent as `bq`
    Boolean,
}

impl QueryMode {
    /// Name of the request parameter carrying the query
    pub fn param(&self) -> &'static str {
        match self {
            Self::Plain => "q",
            Self::Boolean => "bq",
        }
    }
}

/// Builds the encoded query string for one search
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    query: Option<&'a str>,
    filters: &'a Filters,
    return_fields: &'a [String],
    arguments: &'a [(String, String)],
}

impl<'a> QueryBuilder<'a> {
    pub fn new(query: Option<&'a str>, filters: &'a Filters) -> Self {
        Self {
            query,
            filters,
            return_fields: &[],
            arguments: &[],
        }
    }

    /// Fields to request for each hit; empty leaves the service default
    pub fn return_fields(mut self, fields: &'a [String]) -> Self {
        self.return_fields = fields;
        self
    }

    /// Extra parameters appended after everything else
    pub fn arguments(mut self, arguments: &'a Arguments) -> Self {
        self.arguments = arguments.as_slice();
        self
    }

    pub fn mode(&self) -> QueryMode {
        match self.query {
            Some(_) if self.filters.is_empty() => QueryMode::Plain,
            _ => QueryMode::Boolean,
        }
    }

    /// The unencoded boolean expression, if the query is in boolean mode.
    ///
    /// A multi-valued filter becomes one clause per value, all ANDed.
    pub fn boolean_expression(&self) -> Option<String> {
        if self.mode() != QueryMode::Boolean {
            return None;
        }

        let mut clauses = Vec::with_capacity(1 + self.filters.clause_count());
        if let Some(query) = self.query {
            clauses.push(format!("'{}'", query));
        }
        for (field, value) in self.filters.iter() {
            for term in value.values() {
                clauses.push(format!("{}:'{}'", field, term));
            }
        }

        let mut expression = String::from("(and");
        for clause in clauses {
            expression.push(' ');
            expression.push_str(&clause);
        }
        expression.push(')');
        Some(expression)
    }

    /// The full encoded query string (without a leading `?`)
    pub fn build(&self) -> String {
        let mode = self.mode();
        let value = match mode {
            QueryMode::Plain => self.query.unwrap_or_default().to_string(),
            QueryMode::Boolean => self.boolean_expression().unwrap_or_default(),
        };

        let mut fragment = format!("{}={}", mode.param(), encode(&value));

        if !self.return_fields.is_empty() {
            fragment.push_str("&return-fields=");
            fragment.push_str(&encode(&self.return_fields.join(",")));
        }

        for (name, value) in self.arguments {
            fragment.push('&');
            fragment.push_str(name);
            fragment.push('=');
            fragment.push_str(&encode(value));
        }

        fragment
    }
}
