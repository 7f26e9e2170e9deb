use crate::element::Attributes;

/// Shape of a numeric fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactKind {
    #[default]
    Value,
    Range,
    RelativeValue,
    RelativeRange,
}

impl FactKind {
    /// The `char_type` attribute written for this kind. Plain values have none.
    pub fn char_type(self) -> Option<&'static str> {
        match self {
            FactKind::Value => None,
            FactKind::Range => Some("range_value"),
            FactKind::RelativeValue => Some("relative_value"),
            FactKind::RelativeRange => Some("relative_range_value"),
        }
    }

    pub fn relative(self) -> Self {
        match self {
            FactKind::Value | FactKind::RelativeValue => FactKind::RelativeValue,
            FactKind::Range | FactKind::RelativeRange => FactKind::RelativeRange,
        }
    }

    pub fn is_range(self) -> bool {
        matches!(self, FactKind::Range | FactKind::RelativeRange)
    }
}

/// One numeric Character fact produced by the parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterFact {
    pub name: String,
    pub kind: FactKind,
    pub value: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub from_inclusive: Option<bool>,
    pub to_inclusive: Option<bool>,
    pub unit: Option<String>,
    pub from_unit: Option<String>,
    pub to_unit: Option<String>,
    pub upper_restricted: Option<bool>,
    pub relative_constraint: Option<String>,
}

impl CharacterFact {
    pub fn value(name: &str, value: &str) -> Self {
        Self { name: name.to_string(), value: Some(value.to_string()), ..Self::default() }
    }

    pub fn range(name: &str, from: Option<String>, to: Option<String>) -> Self {
        Self { name: name.to_string(), kind: FactKind::Range, from, to, ..Self::default() }
    }

    /// Attach `unit` to whichever bounds this fact carries.
    pub(crate) fn with_unit(mut self, unit: Option<&str>) -> Self {
        let Some(unit) = unit else { return self };
        if self.kind.is_range() {
            if self.from.is_some() {
                self.from_unit = Some(unit.to_string());
            }
            if self.to.is_some() {
                self.to_unit = Some(unit.to_string());
            }
        } else {
            self.unit = Some(unit.to_string());
        }
        self
    }

    pub fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::default();
        attrs.set("name", self.name.as_str());
        if let Some(char_type) = self.kind.char_type() {
            attrs.set("char_type", char_type);
        }
        let text = [
            ("value", &self.value),
            ("unit", &self.unit),
            ("from", &self.from),
            ("from_unit", &self.from_unit),
            ("to", &self.to),
            ("to_unit", &self.to_unit),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                attrs.set(key, value.as_str());
            }
        }
        let flags = [
            ("from_inclusive", self.from_inclusive),
            ("to_inclusive", self.to_inclusive),
            ("upper_restricted", self.upper_restricted),
        ];
        for (key, flag) in flags {
            if let Some(flag) = flag {
                attrs.set(key, flag.to_string());
            }
        }
        if let Some(constraint) = &self.relative_constraint {
            attrs.set("relative_constraint", constraint.as_str());
        }
        attrs
    }
}
