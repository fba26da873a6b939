use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location inside a config/value tree, rendered as `$.field[2].x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPath {
    segments: Vec<PathSegment>,
}

impl ConfigPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended by a record field.
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.segments.push(PathSegment::Field(name.into()));
        out
    }

    /// Returns a new path extended by a list index.
    pub fn index(&self, i: usize) -> Self {
        let mut out = self.clone();
        out.segments.push(PathSegment::Index(i));
        out
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for seg in &self.segments {
            match seg {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}
