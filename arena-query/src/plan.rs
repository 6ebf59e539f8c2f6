use arena_core::Scalar;

/// How bind markers are spelled in generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `:1`, `:2`, ...
    #[default]
    Colon,
    /// `?1`, `?2`, ... (SQLite numbered parameters)
    Question,
    /// `$1`, `$2`, ...
    Dollar,
}

impl Placeholder {
    fn prefix(self) -> char {
        match self {
            Placeholder::Colon => ':',
            Placeholder::Question => '?',
            Placeholder::Dollar => '$',
        }
    }

    pub fn marker(self, position: usize) -> String {
        format!("{}{}", self.prefix(), position)
    }
}

/// Parameterized statement: `binds[i]` fills the marker numbered `i + 1` in `sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementPlan {
    pub sql: String,
    pub binds: Vec<Scalar>,
}

impl StatementPlan {
    pub fn new(sql: impl Into<String>, binds: Vec<Scalar>) -> Self {
        Self {
            sql: sql.into(),
            binds,
        }
    }

    /// Statement with no bind parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    /// SQL with each numbered marker replaced by its value, for log lines only.
    /// Markers inside single-quoted literals are left alone. Never execute this string.
    pub fn display_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut in_literal = false;
        let mut chars = self.sql.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if c == '\'' {
                in_literal = !in_literal;
            }
            if in_literal || !matches!(c, ':' | '?' | '$') {
                out.push(c);
                continue;
            }
            let mut digits = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            match digits.parse::<usize>().ok().and_then(|n| self.binds.get(n.wrapping_sub(1))) {
                Some(value) => out.push_str(&value.to_string()),
                None => {
                    out.push(c);
                    out.push_str(&digits);
                }
            }
        }
        out
    }
}

/// Accumulates SQL text and the matching bind list.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    binds: Vec<Scalar>,
    style: Placeholder,
}

impl SqlWriter {
    pub(crate) fn new(style: Placeholder) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Identifiers are written verbatim. This is the only place caller-supplied
    /// text enters the SQL string, so table and column names reaching it must be trusted.
    pub(crate) fn push_ident(&mut self, ident: &str) -> &mut Self {
        self.sql.push_str(ident);
        self
    }

    /// Values never enter the SQL text, only the bind list.
    pub(crate) fn push_bind(&mut self, value: Scalar) -> &mut Self {
        self.binds.push(value);
        let marker = self.style.marker(self.binds.len());
        self.sql.push_str(&marker);
        self
    }

    /// `<ident> = :n` joined by `separator`.
    pub(crate) fn push_assignments<'a, I>(&mut self, pairs: I, separator: &str) -> &mut Self
    where
        I: IntoIterator<Item = (&'a str, Scalar)>,
    {
        for (i, (column, value)) in pairs.into_iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            self.push_ident(column).push(" = ").push_bind(value);
        }
        self
    }

    pub(crate) fn finish(self) -> StatementPlan {
        StatementPlan {
            sql: self.sql,
            binds: self.binds,
        }
    }
}
