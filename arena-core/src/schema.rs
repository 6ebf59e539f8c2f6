use serde::{Deserialize, Serialize};

/// One declared column as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub length: i64,
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Build from a raw catalog entry whose type may carry a `(n[,m])` suffix.
    pub fn from_declared(name: impl Into<String>, declared_type: &str, not_null: bool) -> Self {
        let (data_type, length) = split_declared_type(declared_type);
        Self {
            name: name.into(),
            data_type,
            length,
            nullable: !not_null,
        }
    }
}

/// `varchar2(32)` -> (`VARCHAR2`, 32); `DECIMAL(10, 2)` -> (`DECIMAL`, 10); `TEXT` -> (`TEXT`, 0)
pub fn split_declared_type(declared: &str) -> (String, i64) {
    let declared = declared.trim();
    match declared.find('(') {
        Some(open) => {
            let base = declared[..open].trim().to_uppercase();
            let args = declared[open + 1..].trim_end_matches(')');
            let length = args
                .split(',')
                .next()
                .and_then(|n| n.trim().parse::<i64>().ok())
                .unwrap_or(0);
            (base, length)
        }
        None => (declared.to_uppercase(), 0),
    }
}
