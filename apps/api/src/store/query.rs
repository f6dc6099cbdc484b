//! Query specification for list endpoints.
//!
//! Filters, text search, and sort keys are explicit values validated against
//! a per-collection allow-list before they are lowered to a store query:
//! either a document predicate (memory backend) or parameterized SQL
//! (Postgres backend). User input never reaches a query as interpolated text;
//! only the static field names below do.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use pagination::PageParams;
use serde_json::Value;
use thiserror::Error;

/// How a field is typed for comparison and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    Text,
    Bool,
    Date,
}

/// One allow-listed field of a collection.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Every collection is stamped with `createdAt`, so it is always sortable.
pub const CREATED_AT: FieldDef = FieldDef {
    name: "createdAt",
    kind: FieldKind::Date,
};

/// Per-collection allow-list: which fields may be filtered, sorted, searched.
/// `searchable` entries must name `Text` fields.
#[derive(Debug)]
pub struct Schema {
    pub filterable: &'static [FieldDef],
    pub sortable: &'static [FieldDef],
    pub searchable: &'static [&'static str],
}

impl Schema {
    fn filterable_field(&self, name: &str) -> Option<FieldDef> {
        self.filterable.iter().copied().find(|f| f.name == name)
    }

    fn sortable_field(&self, name: &str) -> Option<FieldDef> {
        if name == CREATED_AT.name {
            return Some(CREATED_AT);
        }
        self.sortable.iter().copied().find(|f| f.name == name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("field '{0}' cannot be filtered on this resource")]
    UnknownField(String),

    #[error("field '{0}' does not support substring matching")]
    NotText(String),

    #[error("unknown sort key '{0}'")]
    UnknownSortKey(String),
}

impl QueryError {
    /// The offending field or sort key, for the 400 field-error list.
    pub fn field(&self) -> &str {
        match self {
            QueryError::UnknownField(f) | QueryError::NotText(f) => f,
            QueryError::UnknownSortKey(k) => k,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Exact match on the serialized field value.
    Eq(Value),
    /// Membership in a set of string values.
    In(Vec<String>),
    /// Case-insensitive substring match on a text field.
    Contains(String),
}

#[derive(Debug, Clone)]
struct Filter {
    field: FieldDef,
    op: FilterOp,
}

#[derive(Debug, Clone)]
struct Search {
    fields: &'static [&'static str],
    needle: String,
}

#[derive(Debug, Clone, Copy)]
struct Sort {
    field: FieldDef,
    descending: bool,
}

impl Default for Sort {
    fn default() -> Self {
        // Newest first, matching the original list ordering.
        Self {
            field: CREATED_AT,
            descending: true,
        }
    }
}

/// An explicit, validated query over one collection.
#[derive(Debug, Clone)]
pub struct Query {
    schema: &'static Schema,
    filters: Vec<Filter>,
    search: Option<Search>,
    sort: Sort,
    page: Option<PageParams>,
}

impl Query {
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            filters: Vec::new(),
            search: None,
            sort: Sort::default(),
            page: None,
        }
    }

    /// Exact-match filter. The value must already be in its wire form
    /// (UUIDs as hyphenated strings, booleans as booleans).
    pub fn filter_eq(mut self, field: &str, value: impl Into<Value>) -> Result<Self, QueryError> {
        let field = self
            .schema
            .filterable_field(field)
            .ok_or_else(|| QueryError::UnknownField(field.to_string()))?;
        self.filters.push(Filter {
            field,
            op: FilterOp::Eq(value.into()),
        });
        Ok(self)
    }

    /// Set-membership filter, e.g. an `industry=Finance,Tech` parameter.
    pub fn filter_in<I, S>(mut self, field: &str, values: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = self
            .schema
            .filterable_field(field)
            .ok_or_else(|| QueryError::UnknownField(field.to_string()))?;
        self.filters.push(Filter {
            field,
            op: FilterOp::In(values.into_iter().map(Into::into).collect()),
        });
        Ok(self)
    }

    /// Case-insensitive substring filter on a single text field.
    pub fn filter_contains(mut self, field: &str, needle: &str) -> Result<Self, QueryError> {
        let field = self
            .schema
            .filterable_field(field)
            .ok_or_else(|| QueryError::UnknownField(field.to_string()))?;
        if field.kind != FieldKind::Text {
            return Err(QueryError::NotText(field.name.to_string()));
        }
        self.filters.push(Filter {
            field,
            op: FilterOp::Contains(needle.to_string()),
        });
        Ok(self)
    }

    /// Case-insensitive substring search across the collection's declared
    /// searchable fields (OR across fields, AND with the other filters).
    pub fn search(mut self, needle: &str) -> Self {
        self.search = Some(Search {
            fields: self.schema.searchable,
            needle: needle.to_string(),
        });
        self
    }

    /// Sort key from a `sortBy` parameter; a leading `-` selects descending.
    pub fn sort_by(mut self, key: &str) -> Result<Self, QueryError> {
        let (name, descending) = match key.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (key, false),
        };
        let field = self
            .schema
            .sortable_field(name)
            .ok_or_else(|| QueryError::UnknownSortKey(key.to_string()))?;
        self.sort = Sort { field, descending };
        Ok(self)
    }

    pub fn paged(mut self, page: PageParams) -> Self {
        self.page = Some(page);
        self
    }

    /// Window of a single record, for uniqueness probes.
    pub fn first(self) -> Self {
        self.paged(PageParams::new(0, 1))
    }

    pub fn page(&self) -> Option<PageParams> {
        self.page
    }

    // ── Memory lowering: document predicate and comparator ──────────────────

    pub(crate) fn matches(&self, doc: &Value) -> bool {
        self.filters.iter().all(|f| filter_matches(doc, f))
            && self
                .search
                .as_ref()
                .map_or(true, |s| search_matches(doc, s))
    }

    pub(crate) fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ord = compare_field(a, b, self.sort.field);
        if self.sort.descending {
            ord.reverse()
        } else {
            ord
        }
    }

    // ── SQL lowering: parameterized WHERE and ORDER BY ──────────────────────

    /// Builds the WHERE clause with `$n` placeholders starting at
    /// `first_param`, together with the bind values in placeholder order.
    /// Returns an empty clause when the query has no conditions.
    pub(crate) fn to_sql_where(&self, first_param: usize) -> (String, Vec<SqlBind>) {
        let mut conjuncts = Vec::new();
        let mut binds = Vec::new();
        let mut param = first_param;

        for filter in &self.filters {
            let column = doc_field(filter.field.name);
            match &filter.op {
                FilterOp::Eq(value) => {
                    conjuncts.push(format!("{column} = ${param}"));
                    binds.push(SqlBind::Text(value_as_text(value)));
                    param += 1;
                }
                FilterOp::In(values) => {
                    conjuncts.push(format!("{column} = ANY(${param})"));
                    binds.push(SqlBind::TextList(values.clone()));
                    param += 1;
                }
                FilterOp::Contains(needle) => {
                    conjuncts.push(format!("{column} ILIKE ${param}"));
                    binds.push(SqlBind::Text(like_pattern(needle)));
                    param += 1;
                }
            }
        }

        if let Some(search) = &self.search {
            let mut alternatives = Vec::new();
            for field in search.fields {
                alternatives.push(format!("{} ILIKE ${param}", doc_field(field)));
                binds.push(SqlBind::Text(like_pattern(&search.needle)));
                param += 1;
            }
            if alternatives.is_empty() {
                // A search over a collection with no searchable fields can
                // never match.
                conjuncts.push("FALSE".to_string());
            } else {
                conjuncts.push(format!("({})", alternatives.join(" OR ")));
            }
        }

        if conjuncts.is_empty() {
            (String::new(), binds)
        } else {
            (format!("WHERE {}", conjuncts.join(" AND ")), binds)
        }
    }

    /// ORDER BY clause with a type-correct cast and an `id` tiebreak so
    /// page windows stay stable across requests.
    pub(crate) fn to_sql_order(&self) -> String {
        let field = self.sort.field;
        let expr = match field.kind {
            FieldKind::Date => format!("({})::timestamptz", doc_field(field.name)),
            FieldKind::Bool => format!("({})::boolean", doc_field(field.name)),
            FieldKind::Text | FieldKind::Id => doc_field(field.name),
        };
        let direction = if self.sort.descending { "DESC" } else { "ASC" };
        format!("ORDER BY {expr} {direction}, id ASC")
    }
}

/// Bind values produced by the SQL lowering, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SqlBind {
    Text(String),
    TextList(Vec<String>),
}

fn doc_field(name: &str) -> String {
    // `name` is always a static allow-listed identifier, never user input.
    format!("doc->>'{name}'")
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// `%needle%` with LIKE wildcards and the escape character neutralized.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{escaped}%")
}

fn filter_matches(doc: &Value, filter: &Filter) -> bool {
    let field_value = doc.get(filter.field.name);
    match &filter.op {
        FilterOp::Eq(expected) => field_value == Some(expected),
        FilterOp::In(options) => field_value
            .and_then(Value::as_str)
            .map_or(false, |s| options.iter().any(|o| o == s)),
        FilterOp::Contains(needle) => contains_insensitive(field_value, needle),
    }
}

fn search_matches(doc: &Value, search: &Search) -> bool {
    search
        .fields
        .iter()
        .any(|f| contains_insensitive(doc.get(*f), &search.needle))
}

/// Substring match on a text field, or on any element of a string-array
/// field (the SQL lowering scans the array's text form the same way).
fn contains_insensitive(field_value: Option<&Value>, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    match field_value {
        Some(Value::String(s)) => s.to_lowercase().contains(&needle),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(&needle)),
        _ => false,
    }
}

/// Missing/null values order last ascending and first descending, matching
/// the Postgres NULLS default so both backends page identically.
fn compare_field(a: &Value, b: &Value, field: FieldDef) -> Ordering {
    match (sort_key(a, field), sort_key(b, field)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Bool(bool),
    Time(DateTime<Utc>),
    Text(String),
}

fn sort_key(doc: &Value, field: FieldDef) -> Option<SortKey> {
    let value = doc.get(field.name)?;
    match field.kind {
        FieldKind::Bool => value.as_bool().map(SortKey::Bool),
        FieldKind::Date => value.as_str().and_then(parse_time).map(SortKey::Time),
        FieldKind::Text | FieldKind::Id => value.as_str().map(|s| SortKey::Text(s.to_string())),
    }
}

/// Accepts both RFC 3339 timestamps (`createdAt`) and plain dates
/// (`deadline`), normalizing dates to midnight UTC.
fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TEST_SCHEMA: Schema = Schema {
        filterable: &[
            FieldDef {
                name: "companyId",
                kind: FieldKind::Id,
            },
            FieldDef {
                name: "position",
                kind: FieldKind::Text,
            },
            FieldDef {
                name: "shareProfile",
                kind: FieldKind::Bool,
            },
            FieldDef {
                name: "deadline",
                kind: FieldKind::Date,
            },
        ],
        sortable: &[
            FieldDef {
                name: "position",
                kind: FieldKind::Text,
            },
            FieldDef {
                name: "deadline",
                kind: FieldKind::Date,
            },
        ],
        searchable: &["position", "notes"],
    };

    static EMPTY_SEARCH_SCHEMA: Schema = Schema {
        filterable: &[],
        sortable: &[],
        searchable: &[],
    };

    #[test]
    fn test_filter_eq_rejects_unknown_field() {
        let err = Query::new(&TEST_SCHEMA)
            .filter_eq("password", "x")
            .unwrap_err();
        assert_eq!(err, QueryError::UnknownField("password".to_string()));
        assert_eq!(err.field(), "password");
    }

    #[test]
    fn test_filter_contains_rejects_non_text_field() {
        let err = Query::new(&TEST_SCHEMA)
            .filter_contains("companyId", "acme")
            .unwrap_err();
        assert_eq!(err, QueryError::NotText("companyId".to_string()));
    }

    #[test]
    fn test_sort_by_rejects_unknown_key() {
        let err = Query::new(&TEST_SCHEMA).sort_by("salary").unwrap_err();
        assert_eq!(err, QueryError::UnknownSortKey("salary".to_string()));
    }

    #[test]
    fn test_sort_by_dash_prefix_is_descending() {
        let q = Query::new(&TEST_SCHEMA).sort_by("-deadline").unwrap();
        assert!(q.sort.descending);
        assert_eq!(q.sort.field.name, "deadline");
    }

    #[test]
    fn test_created_at_is_always_sortable() {
        let q = Query::new(&TEST_SCHEMA).sort_by("createdAt").unwrap();
        assert_eq!(q.sort.field.name, "createdAt");
        assert!(!q.sort.descending);
    }

    #[test]
    fn test_default_sort_is_created_at_descending() {
        let q = Query::new(&TEST_SCHEMA);
        assert_eq!(q.sort.field.name, "createdAt");
        assert!(q.sort.descending);
    }

    #[test]
    fn test_matches_eq_on_string_and_bool() {
        let doc = json!({"companyId": "c-1", "shareProfile": true});
        let q = Query::new(&TEST_SCHEMA)
            .filter_eq("companyId", "c-1")
            .unwrap()
            .filter_eq("shareProfile", true)
            .unwrap();
        assert!(q.matches(&doc));

        let hidden = json!({"companyId": "c-1", "shareProfile": false});
        assert!(!q.matches(&hidden));
    }

    #[test]
    fn test_matches_eq_missing_field_is_false() {
        let q = Query::new(&TEST_SCHEMA).filter_eq("companyId", "c-1").unwrap();
        assert!(!q.matches(&json!({"position": "intern"})));
    }

    #[test]
    fn test_matches_in_set() {
        let q = Query::new(&TEST_SCHEMA)
            .filter_in("companyId", ["c-1", "c-2"])
            .unwrap();
        assert!(q.matches(&json!({"companyId": "c-2"})));
        assert!(!q.matches(&json!({"companyId": "c-3"})));
    }

    #[test]
    fn test_matches_contains_is_case_insensitive() {
        let q = Query::new(&TEST_SCHEMA)
            .filter_contains("position", "ENGINEER")
            .unwrap();
        assert!(q.matches(&json!({"position": "Software Engineer II"})));
        assert!(!q.matches(&json!({"position": "Product Manager"})));
    }

    #[test]
    fn test_search_hits_any_declared_field() {
        let q = Query::new(&TEST_SCHEMA).search("backend");
        assert!(q.matches(&json!({"position": "Backend Intern", "notes": ""})));
        assert!(q.matches(&json!({"position": "SWE", "notes": "met the backend team"})));
        assert!(!q.matches(&json!({"position": "SWE", "notes": "frontend only"})));
    }

    #[test]
    fn test_search_with_no_searchable_fields_matches_nothing() {
        let q = Query::new(&EMPTY_SEARCH_SCHEMA).search("anything");
        assert!(!q.matches(&json!({"position": "anything"})));
    }

    #[test]
    fn test_search_scans_string_array_fields() {
        let q = Query::new(&TEST_SCHEMA).search("pay");
        assert!(q.matches(&json!({"position": "SWE", "notes": ["benefits", "Payroll team"]})));
        assert!(!q.matches(&json!({"position": "SWE", "notes": ["benefits"]})));
    }

    #[test]
    fn test_compare_dates_ascending_and_descending() {
        let early = json!({"deadline": "2025-01-10"});
        let late = json!({"deadline": "2025-03-01"});

        let asc = Query::new(&TEST_SCHEMA).sort_by("deadline").unwrap();
        assert_eq!(asc.compare(&early, &late), Ordering::Less);

        let desc = Query::new(&TEST_SCHEMA).sort_by("-deadline").unwrap();
        assert_eq!(desc.compare(&early, &late), Ordering::Greater);
    }

    #[test]
    fn test_compare_missing_value_orders_last_ascending() {
        let dated = json!({"deadline": "2025-01-10"});
        let undated = json!({});
        let asc = Query::new(&TEST_SCHEMA).sort_by("deadline").unwrap();
        assert_eq!(asc.compare(&dated, &undated), Ordering::Less);
        let desc = Query::new(&TEST_SCHEMA).sort_by("-deadline").unwrap();
        assert_eq!(desc.compare(&dated, &undated), Ordering::Greater);
    }

    #[test]
    fn test_compare_parses_rfc3339_timestamps() {
        let a = json!({"createdAt": "2025-06-01T10:00:00Z"});
        let b = json!({"createdAt": "2025-06-01T10:00:00.500Z"});
        let asc = Query::new(&TEST_SCHEMA).sort_by("createdAt").unwrap();
        assert_eq!(asc.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_sql_where_numbers_placeholders_in_order() {
        let q = Query::new(&TEST_SCHEMA)
            .filter_eq("companyId", "c-1")
            .unwrap()
            .filter_in("position", ["SWE", "PM"])
            .unwrap();
        let (clause, binds) = q.to_sql_where(1);
        assert_eq!(
            clause,
            "WHERE doc->>'companyId' = $1 AND doc->>'position' = ANY($2)"
        );
        assert_eq!(
            binds,
            vec![
                SqlBind::Text("c-1".to_string()),
                SqlBind::TextList(vec!["SWE".to_string(), "PM".to_string()]),
            ]
        );
    }

    #[test]
    fn test_sql_where_search_expands_to_or_group() {
        let q = Query::new(&TEST_SCHEMA).search("rust");
        let (clause, binds) = q.to_sql_where(3);
        assert_eq!(
            clause,
            "WHERE (doc->>'position' ILIKE $3 OR doc->>'notes' ILIKE $4)"
        );
        assert_eq!(
            binds,
            vec![
                SqlBind::Text("%rust%".to_string()),
                SqlBind::Text("%rust%".to_string()),
            ]
        );
    }

    #[test]
    fn test_sql_where_empty_query_has_no_clause() {
        let (clause, binds) = Query::new(&TEST_SCHEMA).to_sql_where(1);
        assert!(clause.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }

    #[test]
    fn test_sql_order_casts_dates_and_keeps_id_tiebreak() {
        let q = Query::new(&TEST_SCHEMA).sort_by("-deadline").unwrap();
        assert_eq!(
            q.to_sql_order(),
            "ORDER BY (doc->>'deadline')::timestamptz DESC, id ASC"
        );
    }

    #[test]
    fn test_sql_order_plain_text_field() {
        let q = Query::new(&TEST_SCHEMA).sort_by("position").unwrap();
        assert_eq!(q.to_sql_order(), "ORDER BY doc->>'position' ASC, id ASC");
    }

    #[test]
    fn test_bool_eq_lowered_as_text_compare() {
        let q = Query::new(&TEST_SCHEMA)
            .filter_eq("shareProfile", true)
            .unwrap();
        let (clause, binds) = q.to_sql_where(1);
        assert_eq!(clause, "WHERE doc->>'shareProfile' = $1");
        assert_eq!(binds, vec![SqlBind::Text("true".to_string())]);
    }

    #[test]
    fn test_first_sets_single_record_window() {
        let q = Query::new(&TEST_SCHEMA).first();
        let page = q.page().unwrap();
        assert_eq!(page.page, 0);
        assert_eq!(page.per_page, 1);
    }
}
