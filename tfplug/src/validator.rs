use crate::schema::Schema;
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

pub trait Validator: Send + Sync {
    fn description(&self) -> String;

    /// Only called for known, non-null values
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Vec<Diagnostic>);
}

/// Run every attribute validator of `schema` against `config` and flag
/// missing required attributes. Unknown values are skipped.
pub fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let value = config.get(&path).cloned().unwrap_or(Dynamic::Null);

        match value {
            Dynamic::Unknown => {}
            Dynamic::Null => {
                if attr.required {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required attribute",
                            format!("The argument \"{}\" is required", attr.name),
                        )
                        .with_attribute(path),
                    );
                }
            }
            value => {
                for validator in &attr.validators {
                    validator.validate(&value, &attr.name, &mut diagnostics);
                }
            }
        }
    }

    diagnostics
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        format!("string length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if let Some(min) = self.min {
                if s.len() < min {
                    diagnostics.push(Diagnostic::error(
                        format!("{} must have minimum length of {}", attribute_path, min),
                        format!("Got length {}", s.len()),
                    ));
                }
            }
            if let Some(max) = self.max {
                if s.len() > max {
                    diagnostics.push(Diagnostic::error(
                        format!("{} must have maximum length of {}", attribute_path, max),
                        format!("Got length {}", s.len()),
                    ));
                }
            }
        }
    }
}

pub struct StringOneOfValidator {
    pub values: Vec<String>,
}

impl StringOneOfValidator {
    pub fn new(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Validator for StringOneOfValidator {
    fn description(&self) -> String {
        format!("one of {:?}", self.values)
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if !self.values.iter().any(|v| v == s) {
                diagnostics.push(Diagnostic::error(
                    format!("Invalid value for {}", attribute_path),
                    format!("{} must be one of: {:?}, got '{}'", attribute_path, self.values, s),
                ));
            }
        }
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if !self.pattern.is_match(s) {
                diagnostics.push(Diagnostic::error(
                    format!("{} must match {}", attribute_path, self.description),
                    format!("Value '{}' does not match pattern", s),
                ));
            }
        }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        format!("number between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(n) = value.as_number() {
            if let Some(min) = self.min {
                if n < min {
                    diagnostics.push(Diagnostic::error(
                        format!("{} must be at least {}", attribute_path, min),
                        format!("Got {}", n),
                    ));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    diagnostics.push(Diagnostic::error(
                        format!("{} must be at most {}", attribute_path, max),
                        format!("Got {}", n),
                    ));
                }
            }
        }
    }
}

pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for ListLengthValidator {
    fn description(&self) -> String {
        format!("list length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Vec<Diagnostic>) {
        if let Dynamic::List(items) = value {
            if let Some(min) = self.min {
                if items.len() < min {
                    diagnostics.push(Diagnostic::error(
                        format!("{} must have at least {} items", attribute_path, min),
                        format!("Got {} items", items.len()),
                    ));
                }
            }
            if let Some(max) = self.max {
                if items.len() > max {
                    diagnostics.push(Diagnostic::error(
                        format!("{} must have at most {} items", attribute_path, max),
                        format!("Got {} items", items.len()),
                    ));
                }
            }
        }
    }
}
