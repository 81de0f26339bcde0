use serde_json::Value;

/// Equality conditions on top-level row fields, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| row.get(field) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_all_conditions() {
        let row = json!({"tournament_id": 7, "round": 2});

        assert!(Filter::all().matches(&row));
        assert!(Filter::eq("tournament_id", 7).matches(&row));
        assert!(!Filter::eq("tournament_id", 7).and_eq("round", 3).matches(&row));
        assert!(!Filter::eq("missing", 1).matches(&row));
    }
}
