//! Table metadata as reconstructed by introspection or supplied by callers
//! for schema synchronization. Built fresh on every introspection call,
//! never cached.

/// A parsed or caller-supplied column default.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    /// Verbatim SQL, e.g. a function call such as `CURRENT_TIMESTAMP`.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    /// Logical type as declared (`integer`, `varchar`, ...), lowercased.
    pub column_type: String,
    pub is_primary: bool,
    pub is_unique: bool,
    /// Columns are nullable unless declared otherwise.
    pub is_nullable: bool,
    /// Auto-increment generation.
    pub is_generated: bool,
    pub default: Option<DefaultValue>,
}

impl TableColumn {
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        TableColumn {
            name: name.into(),
            column_type: column_type.into(),
            is_primary: false,
            is_unique: false,
            is_nullable: true,
            is_generated: false,
            default: None,
        }
    }

    #[must_use]
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    #[must_use]
    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableIndex {
    /// Defaults to `IDX_<table>_<col1>_<col2>...` when absent.
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

impl TableIndex {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        TableIndex {
            name: None,
            columns,
            is_unique: false,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<TableColumn>,
    pub indices: Vec<TableIndex>,
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            indices: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: Vec<TableColumn>) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn primary_columns(&self) -> Vec<&TableColumn> {
        self.columns.iter().filter(|c| c.is_primary).collect()
    }
}
