//! Descriptors for the display resources served by the generic CRUD endpoints.
//!
//! A [`ResourceSpec`] names the table, the ordering column, and every column with its JSON
//! key, value kind and default. Partial updates may touch only those keys. The repository and
//! the HTTP handlers are written once against this description.

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::sanitize::{SanitizePolicy, plain_text};

/// How a JSON value is coerced and cleaned before it is bound to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Stored as given (trimmed).
    Text,
    /// Nullable text; empty strings become NULL.
    OptionalText,
    /// 32-bit integer; numeric strings are accepted.
    Integer,
    /// Rich text cleaned with the given policy.
    Html(SanitizePolicy),
    /// Text with all markup stripped.
    PlainText,
}

/// Value used when the body omits a column, sends `null`, or sends an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    Required,
    Text(&'static str),
    Null,
    Integer(i32),
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// camelCase key used in JSON bodies and responses.
    pub key: &'static str,
    /// snake_case SQL column name.
    pub name: &'static str,
    pub kind: ColumnKind,
    pub default: ColumnDefault,
}

impl Column {
    pub const fn new(
        key: &'static str,
        name: &'static str,
        kind: ColumnKind,
        default: ColumnDefault,
    ) -> Self {
        Self {
            key,
            name,
            kind,
            default,
        }
    }

    pub const fn display_order() -> Self {
        Self::new(
            "displayOrder",
            "display_order",
            ColumnKind::Integer,
            ColumnDefault::Integer(0),
        )
    }

    /// Coerce a body value (or its absence) into a bindable value.
    pub fn resolve(&self, raw: Option<&Value>) -> Result<FieldValue, AppError> {
        let raw = raw.filter(|v| !v.is_null());
        let value = match self.kind {
            ColumnKind::Integer => match raw {
                None => None,
                Some(v) => Some(FieldValue::Integer(self.integer(v)?)),
            },
            ColumnKind::Text | ColumnKind::OptionalText | ColumnKind::PlainText | ColumnKind::Html(_) => {
                let text = match raw {
                    None => None,
                    Some(v) => Some(self.text(v)?),
                };
                text.filter(|t| !t.is_empty()).map(|t| match self.kind {
                    ColumnKind::OptionalText => FieldValue::OptionalText(Some(t)),
                    _ => FieldValue::Text(t),
                })
            }
        };

        match value {
            Some(value) => Ok(value),
            None => self.fallback(),
        }
    }

    fn text(&self, v: &Value) -> Result<String, AppError> {
        let Some(s) = v.as_str() else {
            return Err(AppError::Validation(format!("`{}` must be a string", self.key)));
        };
        let cleaned = match self.kind {
            ColumnKind::Html(policy) => policy.sanitize(Some(s)),
            ColumnKind::PlainText => plain_text(s),
            _ => s.to_string(),
        };
        Ok(cleaned.trim().to_string())
    }

    fn integer(&self, v: &Value) -> Result<i32, AppError> {
        let parsed = match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) if s.trim().is_empty() => return self.fallback_integer(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| AppError::Validation(format!("`{}` must be an integer", self.key)))
    }

    fn fallback_integer(&self) -> Result<i32, AppError> {
        match self.fallback()? {
            FieldValue::Integer(n) => Ok(n),
            _ => Err(AppError::Validation(format!("`{}` must be an integer", self.key))),
        }
    }

    fn fallback(&self) -> Result<FieldValue, AppError> {
        match self.default {
            ColumnDefault::Required => {
                Err(AppError::Validation(format!("`{}` is required", self.key)))
            }
            ColumnDefault::Text(s) => Ok(FieldValue::Text(s.to_string())),
            ColumnDefault::Null => Ok(FieldValue::OptionalText(None)),
            ColumnDefault::Integer(n) => Ok(FieldValue::Integer(n)),
        }
    }
}

/// A value ready to be bound to a SQL parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    OptionalText(Option<String>),
    Integer(i32),
}

/// One `column = value` pair of an insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: FieldValue,
}

/// Which mutating operations a resource exposes besides create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub update: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const FULL: Self = Self {
        update: true,
        delete: true,
    };
    pub const CREATE_ONLY: Self = Self {
        update: false,
        delete: false,
    };
}

/// Keys clients commonly echo back from a listing; ignored by partial updates.
const READ_ONLY_KEYS: &[&str] = &["id", "createdAt", "updatedAt"];

#[derive(Debug)]
pub struct ResourceSpec {
    /// URL segment under `/api/admin/`.
    pub path: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
    pub table: &'static str,
    pub order_column: &'static str,
    pub columns: &'static [Column],
    pub capabilities: Capabilities,
}

impl ResourceSpec {
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Build the full column list of a new record. Keys the resource does not know are
    /// ignored; missing ones take their defaults.
    pub fn new_record(&self, body: &Value) -> Result<Vec<Assignment>, AppError> {
        let fields = as_object(body)?;
        self.columns
            .iter()
            .map(|column| {
                Ok(Assignment {
                    column: column.name,
                    value: column.resolve(fields.get(column.key))?,
                })
            })
            .collect()
    }

    /// Build the change set of a partial update. Only the descriptor's JSON keys are
    /// accepted; any other key, SQL column names included, rejects the whole request.
    pub fn changes(&self, body: &Value) -> Result<Vec<Assignment>, AppError> {
        let fields = as_object(body)?;
        let mut changes = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            if READ_ONLY_KEYS.contains(&key.as_str()) {
                continue;
            }
            let column = self.column(key).ok_or_else(|| {
                AppError::Validation(format!("field `{key}` cannot be updated"))
            })?;
            changes.push(Assignment {
                column: column.name,
                value: column.resolve(Some(value))?,
            });
        }
        if changes.is_empty() {
            return Err(AppError::Validation("no fields to update".into()));
        }
        Ok(changes)
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::Validation("request body must be a JSON object".into()))
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub static PROJECTS: ResourceSpec = ResourceSpec {
    path: "projects",
    singular: "project",
    plural: "projects",
    table: "projects",
    order_column: "display_order",
    columns: &[
        Column::new("title", "title", ColumnKind::PlainText, ColumnDefault::Required),
        Column::new(
            "description",
            "description",
            ColumnKind::Html(SanitizePolicy::Content),
            ColumnDefault::Text(""),
        ),
        Column::new("category", "category", ColumnKind::Text, ColumnDefault::Text("")),
        Column::new("imageUrl", "image_url", ColumnKind::OptionalText, ColumnDefault::Null),
        Column::new("link", "link", ColumnKind::OptionalText, ColumnDefault::Null),
        Column::display_order(),
    ],
    capabilities: Capabilities::FULL,
};

pub static SERVICES: ResourceSpec = ResourceSpec {
    path: "services",
    singular: "service",
    plural: "services",
    table: "services",
    order_column: "display_order",
    columns: &[
        Column::new("title", "title", ColumnKind::PlainText, ColumnDefault::Required),
        Column::new(
            "description",
            "description",
            ColumnKind::Html(SanitizePolicy::Content),
            ColumnDefault::Text(""),
        ),
        Column::new("icon", "icon", ColumnKind::OptionalText, ColumnDefault::Null),
        Column::display_order(),
    ],
    capabilities: Capabilities::FULL,
};

pub static SERVICES_LIST: ResourceSpec = ResourceSpec {
    path: "services-list",
    singular: "service list item",
    plural: "service list items",
    table: "service_list_items",
    order_column: "display_order",
    columns: &[
        Column::new("title", "title", ColumnKind::PlainText, ColumnDefault::Required),
        Column::display_order(),
    ],
    capabilities: Capabilities::FULL,
};

pub static STATISTICS: ResourceSpec = ResourceSpec {
    path: "statistics",
    singular: "statistic",
    plural: "statistics",
    table: "statistics",
    order_column: "display_order",
    columns: &[
        Column::new("label", "label", ColumnKind::PlainText, ColumnDefault::Required),
        Column::new("value", "value", ColumnKind::Text, ColumnDefault::Required),
        Column::new("suffix", "suffix", ColumnKind::Text, ColumnDefault::Text("")),
        Column::display_order(),
    ],
    capabilities: Capabilities::FULL,
};

pub static TEAM: ResourceSpec = ResourceSpec {
    path: "team",
    singular: "team member",
    plural: "team members",
    table: "team_members",
    order_column: "display_order",
    columns: &[
        Column::new(
            "name",
            "name",
            ColumnKind::Html(SanitizePolicy::Restrictive),
            ColumnDefault::Required,
        ),
        Column::new(
            "position",
            "position",
            ColumnKind::Html(SanitizePolicy::Restrictive),
            ColumnDefault::Text(""),
        ),
        Column::new("imageUrl", "image_url", ColumnKind::OptionalText, ColumnDefault::Null),
        Column::display_order(),
    ],
    capabilities: Capabilities::FULL,
};

pub static TICKER: ResourceSpec = ResourceSpec {
    path: "ticker",
    singular: "ticker item",
    plural: "ticker items",
    table: "ticker_items",
    order_column: "display_order",
    columns: &[
        Column::new("text", "text", ColumnKind::PlainText, ColumnDefault::Required),
        Column::display_order(),
    ],
    capabilities: Capabilities::FULL,
};

pub static SHOP_CATEGORIES: ResourceSpec = ResourceSpec {
    path: "shop-categories",
    singular: "shop category",
    plural: "shop categories",
    table: "shop_categories",
    order_column: "display_order",
    columns: &[
        Column::new("name", "name", ColumnKind::PlainText, ColumnDefault::Text("New Category")),
        Column::new("text", "text", ColumnKind::Text, ColumnDefault::Text("")),
        Column::new("image", "image", ColumnKind::OptionalText, ColumnDefault::Null),
        Column::display_order(),
    ],
    capabilities: Capabilities::CREATE_ONLY,
};

/// Every display resource, in routing order.
pub static RESOURCES: [&ResourceSpec; 7] = [
    &PROJECTS,
    &SERVICES,
    &SERVICES_LIST,
    &STATISTICS,
    &TEAM,
    &TICKER,
    &SHOP_CATEGORIES,
];
