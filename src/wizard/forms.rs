//! Step forms and their declarative validation schemas.
//!
//! Each non-summary step owns one form whose values form a disjoint slice of
//! the instance creation request. Validation never fails with an error value:
//! violations are collected per field so the page can render them next to
//! the offending input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ResourceCatalog;
use crate::wizard::Step;

/// Field name -> first violated rule's message.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Catalog collection a selection must be found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Flavor,
    Image,
    Network,
    Keypair,
    SecurityGroup,
}

impl Lookup {
    fn contains(self, catalog: &ResourceCatalog, value: &str) -> bool {
        match self {
            Lookup::Flavor => catalog.flavor(value).is_some(),
            Lookup::Image => catalog.image(value).is_some(),
            Lookup::Network => catalog.network(value).is_some(),
            Lookup::Keypair => catalog.keypair(value).is_some(),
            Lookup::SecurityGroup => catalog.security_group(value).is_some(),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Lookup::Flavor => "flavor",
            Lookup::Image => "image",
            Lookup::Network => "network",
            Lookup::Keypair => "keypair",
            Lookup::SecurityGroup => "security group",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Required,
    MinLen(usize),
    MaxLen(usize),
    /// Every character must satisfy the predicate.
    Charset(fn(char) -> bool, &'static str),
    /// The first character must satisfy the predicate.
    StartsWith(fn(char) -> bool, &'static str),
    LetterAndDigit,
    InCatalog(Lookup),
}

impl Rule {
    /// Returns the violation message, if any. Empty optional values are left
    /// to `Required`.
    fn check(&self, value: &str, catalog: &ResourceCatalog) -> Option<String> {
        if value.is_empty() {
            return match self {
                Rule::Required => Some(REQUIRED_MESSAGE.to_string()),
                _ => None,
            };
        }
        match *self {
            Rule::Required => None,
            Rule::MinLen(n) if value.chars().count() < n => {
                Some(format!("Must be at least {} characters", n))
            }
            Rule::MaxLen(n) if value.chars().count() > n => {
                Some(format!("Must be at most {} characters", n))
            }
            Rule::Charset(pred, msg) if !value.chars().all(pred) => Some(msg.to_string()),
            Rule::StartsWith(pred, msg) if !value.chars().next().map(pred).unwrap_or(false) => {
                Some(msg.to_string())
            }
            Rule::LetterAndDigit
                if !(value.chars().any(|c| c.is_alphabetic())
                    && value.chars().any(|c| c.is_ascii_digit())) =>
            {
                Some("Must contain at least one letter and one digit".to_string())
            }
            Rule::InCatalog(lookup) if !lookup.contains(catalog, value) => {
                Some(format!("Not an available {}", lookup.noun()))
            }
            _ => None,
        }
    }
}

pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

/// Declarative description of a step form's fields.
pub trait FormSchema {
    const STEP: Step;

    fn fields() -> &'static [FieldSpec];

    fn value(&self, field: &str) -> &str;

    fn validate(&self, catalog: &ResourceCatalog) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in Self::fields() {
            let value = self.value(field.name);
            if let Some(msg) = field.rules.iter().find_map(|r| r.check(value, catalog)) {
                errors.insert(field.name, msg);
            }
        }
        errors
    }
}

fn hostname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

fn alphanumeric(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

const FLAVOR_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "flavor_id",
    rules: &[Rule::Required, Rule::InCatalog(Lookup::Flavor)],
}];

const IMAGE_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "image_id",
    rules: &[Rule::Required, Rule::InCatalog(Lookup::Image)],
}];

const NETWORK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "network_id",
        rules: &[Rule::Required, Rule::InCatalog(Lookup::Network)],
    },
    FieldSpec {
        name: "key_name",
        rules: &[Rule::Required, Rule::InCatalog(Lookup::Keypair)],
    },
    FieldSpec {
        name: "security_group",
        rules: &[Rule::Required, Rule::InCatalog(Lookup::SecurityGroup)],
    },
];

const DETAILS_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        rules: &[
            Rule::Required,
            Rule::MaxLen(63),
            Rule::StartsWith(alphanumeric, "Must start with a letter or digit"),
            Rule::Charset(hostname_char, "Only letters, digits, '-', '_' and '.' are allowed"),
        ],
    },
    FieldSpec {
        name: "admin_username",
        rules: &[
            Rule::Required,
            Rule::MaxLen(32),
            Rule::StartsWith(letter, "Must start with a letter"),
            Rule::Charset(username_char, "Only letters, digits, '-' and '_' are allowed"),
        ],
    },
    FieldSpec {
        name: "admin_password",
        rules: &[Rule::Required, Rule::MinLen(8), Rule::LetterAndDigit],
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorForm {
    pub flavor_id: String,
}

impl FormSchema for FlavorForm {
    const STEP: Step = Step::Flavor;

    fn fields() -> &'static [FieldSpec] {
        FLAVOR_FIELDS
    }

    fn value(&self, field: &str) -> &str {
        match field {
            "flavor_id" => &self.flavor_id,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageForm {
    pub image_id: String,
}

impl FormSchema for ImageForm {
    const STEP: Step = Step::Image;

    fn fields() -> &'static [FieldSpec] {
        IMAGE_FIELDS
    }

    fn value(&self, field: &str) -> &str {
        match field {
            "image_id" => &self.image_id,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkForm {
    pub network_id: String,
    pub key_name: String,
    pub security_group: String,
}

impl FormSchema for NetworkForm {
    const STEP: Step = Step::Network;

    fn fields() -> &'static [FieldSpec] {
        NETWORK_FIELDS
    }

    fn value(&self, field: &str) -> &str {
        match field {
            "network_id" => &self.network_id,
            "key_name" => &self.key_name,
            "security_group" => &self.security_group,
            _ => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsForm {
    pub name: String,
    pub admin_username: String,
    pub admin_password: String,
}

impl FormSchema for DetailsForm {
    const STEP: Step = Step::Details;

    fn fields() -> &'static [FieldSpec] {
        DETAILS_FIELDS
    }

    fn value(&self, field: &str) -> &str {
        match field {
            "name" => &self.name,
            "admin_username" => &self.admin_username,
            "admin_password" => &self.admin_password,
            _ => "",
        }
    }
}

/// One step's values, tagged by the step that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum StepData {
    Flavor(FlavorForm),
    Image(ImageForm),
    Network(NetworkForm),
    Details(DetailsForm),
}

impl StepData {
    /// Empty values for a form step; `None` for the summary.
    pub fn empty(step: Step) -> Option<StepData> {
        match step {
            Step::Flavor => Some(StepData::Flavor(FlavorForm::default())),
            Step::Image => Some(StepData::Image(ImageForm::default())),
            Step::Network => Some(StepData::Network(NetworkForm::default())),
            Step::Details => Some(StepData::Details(DetailsForm::default())),
            Step::Summary => None,
        }
    }

    pub fn step(&self) -> Step {
        match self {
            StepData::Flavor(_) => FlavorForm::STEP,
            StepData::Image(_) => ImageForm::STEP,
            StepData::Network(_) => NetworkForm::STEP,
            StepData::Details(_) => DetailsForm::STEP,
        }
    }

    /// Trim surrounding whitespace from every value except the password.
    pub fn normalized(self) -> StepData {
        fn t(s: String) -> String {
            s.trim().to_string()
        }
        match self {
            StepData::Flavor(f) => StepData::Flavor(FlavorForm { flavor_id: t(f.flavor_id) }),
            StepData::Image(f) => StepData::Image(ImageForm { image_id: t(f.image_id) }),
            StepData::Network(f) => StepData::Network(NetworkForm {
                network_id: t(f.network_id),
                key_name: t(f.key_name),
                security_group: t(f.security_group),
            }),
            StepData::Details(f) => StepData::Details(DetailsForm {
                name: t(f.name),
                admin_username: t(f.admin_username),
                admin_password: f.admin_password,
            }),
        }
    }

    pub fn validate(&self, catalog: &ResourceCatalog) -> FieldErrors {
        match self {
            StepData::Flavor(f) => f.validate(catalog),
            StepData::Image(f) => f.validate(catalog),
            StepData::Network(f) => f.validate(catalog),
            StepData::Details(f) => f.validate(catalog),
        }
    }
}

/// A step's current input plus the errors from its most recent validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepForm {
    data: StepData,
    errors: FieldErrors,
}

impl StepForm {
    pub fn new(data: StepData) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.data.step()
    }

    /// Runs the schema and records field errors. Returns `true` when clean.
    pub fn validate(&mut self, catalog: &ResourceCatalog) -> bool {
        self.errors = self.data.validate(catalog);
        self.errors.is_empty()
    }

    pub fn values(&self) -> &StepData {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub(crate) fn set_values(&mut self, data: StepData) {
        self.data = data;
    }
}
