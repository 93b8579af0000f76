use crate::route::{RouteRecord, RouteSummary, ValidationError};

/// Named routes in insertion order. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<RouteRecord>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RouteRecord) -> Result<(), ValidationError> {
        if self.contains(record.name()) {
            return Err(ValidationError::DuplicateName(record.name().to_string()));
        }
        self.routes.push(record);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.iter().any(|r| r.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&RouteRecord> {
        self.routes.iter().find(|r| r.name() == name)
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes.iter().map(RouteRecord::summary).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteRecord> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }
}

impl Extend<RouteRecord> for RouteCollection {
    /// Skips records whose name is already present.
    fn extend<T: IntoIterator<Item = RouteRecord>>(&mut self, iter: T) {
        for record in iter {
            if let Err(e) = self.push(record) {
                log::warn!("Skipping route: {}", e);
            }
        }
    }
}
