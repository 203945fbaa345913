//! Listing query: `field[op]=value` filters, projection, sorting, paging

use sqlx::{QueryBuilder, Sqlite};

use crate::common::ApiError;

pub const DEFAULT_LIMIT: i64 = 25;

const RESERVED: [&str; 4] = ["select", "sort", "page", "limit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Number,
    Bool,
}

/// Filterable and sortable service attributes: API name, column, kind.
const FIELDS: &[(&str, &str, Kind)] = &[
    ("_id", "s.id", Kind::Text),
    ("title", "s.title", Kind::Text),
    ("description", "s.description", Kind::Text),
    ("price", "s.price", Kind::Number),
    ("duration", "s.duration", Kind::Number),
    ("category", "s.category", Kind::Text),
    ("provider", "s.provider_id", Kind::Text),
    ("isActive", "s.is_active", Kind::Bool),
    ("createdAt", "s.created_at", Kind::Text),
];

fn lookup(field: &str) -> Option<(&'static str, &'static str, Kind)> {
    FIELDS
        .iter()
        .find(|(name, _, _)| *name == field)
        .copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Op {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "gt" => Some(Op::Gt),
            "gte" => Some(Op::Gte),
            "lt" => Some(Op::Lt),
            "lte" => Some(Op::Lte),
            "in" => Some(Op::In),
            _ => None,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Op::Eq => " = ",
            Op::Gt => " > ",
            Op::Gte => " >= ",
            Op::Lt => " < ",
            Op::Lte => " <= ",
            Op::In => " IN ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub op: Op,
    pub values: Vec<FilterValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceQuery {
    pub filters: Vec<Filter>,
    /// API field names to keep in each item
    pub select: Option<Vec<String>>,
    /// Column and descending flag
    pub sort: Vec<(&'static str, bool)>,
    pub page: i64,
    pub limit: i64,
}

impl ServiceQuery {
    /// Rows skipped before this page. Saturates for oversized `page`/`limit`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Parses raw query pairs. Unknown fields are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ApiError> {
        let mut filters: Vec<Filter> = Vec::new();
        let mut select = None;
        let mut sort = Vec::new();
        let mut page = None;
        let mut limit = None;

        for (key, value) in pairs {
            match key.as_str() {
                "select" => {
                    select = Some(split_list(value).map(str::to_string).collect());
                    continue;
                }
                "sort" => {
                    sort = split_list(value)
                        .filter_map(|field| {
                            let (name, desc) = match field.strip_prefix('-') {
                                Some(name) => (name, true),
                                None => (field, false),
                            };
                            lookup(name).map(|(_, column, _)| (column, desc))
                        })
                        .collect();
                    continue;
                }
                "page" => {
                    page = parse_leading_int(value);
                    continue;
                }
                "limit" => {
                    limit = parse_leading_int(value);
                    continue;
                }
                _ => {}
            }

            let (field, op) = split_operator(key)?;
            if RESERVED.contains(&field) {
                continue;
            }
            let Some((name, column, kind)) = lookup(field) else {
                continue;
            };

            let raw_values: Vec<&str> = if op == Op::In {
                split_list(value).collect()
            } else {
                vec![value.as_str()]
            };
            let values = raw_values
                .into_iter()
                .map(|raw| convert(name, kind, raw))
                .collect::<Result<Vec<_>, _>>()?;

            // Repeated `field[in]` keys accumulate.
            match filters
                .iter_mut()
                .find(|f| f.column == column && f.op == Op::In && op == Op::In)
            {
                Some(existing) => existing.values.extend(values),
                None => filters.push(Filter { column, op, values }),
            }
        }

        if sort.is_empty() {
            sort.push(("s.created_at", true));
        }

        Ok(Self {
            filters,
            select,
            sort,
            page: page.filter(|p| *p > 0).unwrap_or(1),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        })
    }

    /// Appends ` WHERE ...` for the filters, if any.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for (i, filter) in self.filters.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            builder.push(filter.column);
            builder.push(filter.op.sql());
            if filter.op == Op::In {
                builder.push("(");
                let mut separated = builder.separated(", ");
                for value in &filter.values {
                    match value {
                        FilterValue::Text(s) => separated.push_bind(s.clone()),
                        FilterValue::Number(n) => separated.push_bind(*n),
                        FilterValue::Bool(b) => separated.push_bind(*b),
                    };
                }
                separated.push_unseparated(")");
            } else if let Some(value) = filter.values.first() {
                match value {
                    FilterValue::Text(s) => builder.push_bind(s.clone()),
                    FilterValue::Number(n) => builder.push_bind(*n),
                    FilterValue::Bool(b) => builder.push_bind(*b),
                };
            }
        }
    }

    pub fn push_order(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(" ORDER BY ");
        for (column, desc) in &self.sort {
            builder.push(*column);
            builder.push(if *desc { " DESC, " } else { " ASC, " });
        }
        builder.push("s.id ASC");
    }

    /// Keeps only selected fields of a serialized item. `_id` always stays.
    pub fn project(&self, item: serde_json::Value) -> serde_json::Value {
        let (Some(select), serde_json::Value::Object(map)) = (&self.select, &item) else {
            return item;
        };
        let kept = map
            .iter()
            .filter(|(key, _)| *key == "_id" || select.iter().any(|s| s == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        serde_json::Value::Object(kept)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// `price[gte]` → (`price`, Gte); `price` → (`price`, Eq).
fn split_operator(key: &str) -> Result<(&str, Op), ApiError> {
    match key.split_once('[') {
        Some((field, rest)) => {
            let raw = rest.strip_suffix(']').unwrap_or(rest);
            let op = Op::parse(raw).ok_or_else(|| {
                ApiError::BadRequest(format!("Unsupported filter operator: {}", raw))
            })?;
            Ok((field, op))
        }
        None => Ok((key, Op::Eq)),
    }
}

fn convert(field: &str, kind: Kind, raw: &str) -> Result<FilterValue, ApiError> {
    let invalid = || ApiError::BadRequest(format!("Invalid value for {}: {}", field, raw));
    match kind {
        Kind::Text => Ok(FilterValue::Text(raw.to_string())),
        Kind::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FilterValue::Number)
            .ok_or_else(invalid),
        Kind::Bool => match raw {
            "true" => Ok(FilterValue::Bool(true)),
            "false" => Ok(FilterValue::Bool(false)),
            _ => Err(invalid()),
        },
    }
}

/// Leading-integer parse: "3" → 3, "2abc" → 2, "abc" → None.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let query = ServiceQuery::from_pairs(&[]).unwrap();
        assert!(query.filters.is_empty());
        assert_eq!(query.sort, vec![("s.created_at", true)]);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_operator_filters() {
        let query = ServiceQuery::from_pairs(&pairs(&[
            ("price[gte]", "10"),
            ("duration[lt]", "60"),
            ("category[in]", "cleaning,repair"),
            ("unknown", "x"),
        ]))
        .unwrap();

        assert_eq!(query.filters.len(), 3);
        assert_eq!(query.filters[0].column, "s.price");
        assert_eq!(query.filters[0].op, Op::Gte);
        assert_eq!(query.filters[0].values, vec![FilterValue::Number(10.0)]);
        assert_eq!(query.filters[2].op, Op::In);
        assert_eq!(
            query.filters[2].values,
            vec![
                FilterValue::Text("cleaning".into()),
                FilterValue::Text("repair".into())
            ]
        );
    }

    #[test]
    fn test_bad_operator_and_value() {
        assert!(ServiceQuery::from_pairs(&pairs(&[("price[regex]", "1")])).is_err());
        assert!(ServiceQuery::from_pairs(&pairs(&[("price", "cheap")])).is_err());
        assert!(ServiceQuery::from_pairs(&pairs(&[("isActive", "maybe")])).is_err());
    }

    #[test]
    fn test_sort_select_and_paging() {
        let query = ServiceQuery::from_pairs(&pairs(&[
            ("sort", "-price,title,bogus"),
            ("select", "title, price"),
            ("page", "3abc"),
            ("limit", "0"),
        ]))
        .unwrap();

        assert_eq!(query.sort, vec![("s.price", true), ("s.title", false)]);
        assert_eq!(query.select, Some(vec!["title".to_string(), "price".to_string()]));
        assert_eq!(query.page, 3);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn test_offset_saturates() {
        let query = ServiceQuery::from_pairs(&pairs(&[
            ("page", "9223372036854775807"),
            ("limit", "9223372036854775807"),
        ]))
        .unwrap();
        assert_eq!(query.page, i64::MAX);
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn test_projection_keeps_id() {
        let query = ServiceQuery::from_pairs(&pairs(&[("select", "title")])).unwrap();
        let item = serde_json::json!({"_id": "S_1", "title": "Deep clean", "price": 40.0});
        assert_eq!(
            query.project(item),
            serde_json::json!({"_id": "S_1", "title": "Deep clean"})
        );
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int("2abc"), Some(2));
        assert_eq!(parse_leading_int("-1"), Some(-1));
        assert_eq!(parse_leading_int("abc"), None);
    }
}
