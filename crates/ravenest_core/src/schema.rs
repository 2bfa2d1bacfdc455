//! Declarative field rules shared by the entity validators.
//!
//! Each entity kind describes its fields as a table of [`FieldRule`]s
//! (presence plus [`Shape`]) and hands the table to [`check_fields`]. Rules
//! that span two fields use [`PairedStat`], and ID naming is handled once by
//! [`check_id_naming`] for every entity kind.

use crate::issue::{IssueSink, Severity};
use crate::loader::{JsonNode, JsonObject};

/// Maximum length, in characters, of free-text description fields.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Kind of entity, used to phrase messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Player or enemy combatant.
    Combatant,
    /// Fiefdom building type.
    Building,
    /// Hero.
    Hero,
    /// Fiefdom official.
    Official,
}

impl EntityKind {
    /// Capitalised label, e.g. `Combatant`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Combatant => "Combatant",
            Self::Building => "Building",
            Self::Hero => "Hero",
            Self::Official => "Official",
        }
    }

    /// Lowercase noun, e.g. `combatant`.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Combatant => "combatant",
            Self::Building => "building",
            Self::Hero => "hero",
            Self::Official => "official",
        }
    }

    const fn lowercase_hint(self) -> &'static str {
        match self {
            Self::Building => ", use snake_case",
            _ => "",
        }
    }
}

/// Message prefix and line for one entity or one object nested inside it.
///
/// `label` names the object (`Hero 'arthur'.skills.fireball`), `prefix` is
/// prepended to field names when the fields live in a sub-object reported
/// against the parent (`stats.`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    label: String,
    prefix: String,
    line: usize,
}

impl Scope {
    /// Scope for a top-level entity.
    #[must_use]
    pub fn entity(kind: EntityKind, id: &str, line: usize) -> Self {
        Self {
            label: format!("{} '{id}'", kind.label()),
            prefix: String::new(),
            line,
        }
    }

    /// Scope for a nested object, e.g. `child("skills.fireball")`.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self {
            label: format!("{}.{}{segment}", self.label, self.prefix),
            prefix: String::new(),
            line: self.line,
        }
    }

    /// Same label, with field names reported under `segment.`.
    #[must_use]
    pub fn nested(&self, segment: &str) -> Self {
        Self {
            label: self.label.clone(),
            prefix: format!("{}{segment}.", self.prefix),
            line: self.line,
        }
    }

    /// Object label, e.g. `Building 'keep'`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Line issues in this scope are reported at.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Field name as written in "missing required field" messages.
    #[must_use]
    pub fn qualified(&self, field: &str) -> String {
        format!("{}{field}", self.prefix)
    }

    /// Full path of a field, e.g. `Building 'keep'.width`.
    #[must_use]
    pub fn path(&self, field: &str) -> String {
        format!("{}.{}{field}", self.label, self.prefix)
    }

    fn error(&self, sink: &mut IssueSink<'_>, message: String) {
        sink.error_at(self.line, message);
    }

    fn warn(&self, sink: &mut IssueSink<'_>, message: String) {
        sink.warn_at(self.line, message);
    }

    /// Report a missing required field.
    pub fn missing(&self, sink: &mut IssueSink<'_>, field: &str) {
        self.error(
            sink,
            format!(
                "{} is missing required field '{}'",
                self.label,
                self.qualified(field)
            ),
        );
    }
}

/// Whether a field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absence is an ERROR.
    Required,
    /// Absence is fine; present values are still checked.
    Optional,
}

/// Lower bound applied to the elements of a number array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Any number.
    Any,
    /// Must be `>= 0`; violations reported at the given severity.
    NonNegative(Severity),
    /// Must be `> 0`; violations reported at the given severity.
    Positive(Severity),
}

/// Expected shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Non-empty string.
    NonEmptyString,
    /// Non-empty string reported as `<entity> has invalid '<field>' field`.
    Name,
    /// Integer `>= min`.
    Integer {
        /// Smallest accepted value.
        min: i64,
    },
    /// `true` / `false`.
    Boolean,
    /// Array of numbers.
    NumberArray(Bound),
    /// Array of integers, optionally within an inclusive range.
    IntegerArray {
        /// Inclusive `(low, high)` range for each element.
        range: Option<(i64, i64)>,
    },
    /// String drawn from a fixed set.
    OneOf(&'static [&'static str]),
    /// Non-empty array of strings drawn from a fixed set.
    OneOfArray(&'static [&'static str]),
    /// Object whose keys are restricted to a fixed set and whose values are
    /// numbers. Unexpected keys are a WARN.
    NumberMap(&'static [&'static str]),
    /// Free text bounded by [`DESCRIPTION_MAX_CHARS`]. Violations are WARN.
    Description,
}

/// One field of an entity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name.
    pub name: &'static str,
    /// Required or optional.
    pub presence: Presence,
    /// Expected value shape.
    pub shape: Shape,
}

impl FieldRule {
    /// A required field.
    #[must_use]
    pub const fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            presence: Presence::Required,
            shape,
        }
    }

    /// An optional field.
    #[must_use]
    pub const fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            presence: Presence::Optional,
            shape,
        }
    }
}

/// Check every rule in order. Returns `true` if no ERROR was recorded.
pub fn check_fields(
    scope: &Scope,
    obj: &JsonObject,
    rules: &[FieldRule],
    sink: &mut IssueSink<'_>,
) -> bool {
    let mut valid = true;
    for rule in rules {
        valid &= check_field(scope, obj, rule, sink);
    }
    valid
}

/// Check one rule. Returns `true` if no ERROR was recorded.
pub fn check_field(
    scope: &Scope,
    obj: &JsonObject,
    rule: &FieldRule,
    sink: &mut IssueSink<'_>,
) -> bool {
    match obj.get(rule.name) {
        Some(value) => check_shape(scope, rule.name, value, rule.shape, sink),
        None if rule.presence == Presence::Required => {
            scope.missing(sink, rule.name);
            false
        }
        None => true,
    }
}

/// Check `value` (the content of `field`) against `shape`.
/// Returns `true` if no ERROR was recorded.
pub fn check_shape(
    scope: &Scope,
    field: &str,
    value: &JsonNode,
    shape: Shape,
    sink: &mut IssueSink<'_>,
) -> bool {
    let path = scope.path(field);
    match shape {
        Shape::NonEmptyString => match value.as_str() {
            Some(s) if !s.is_empty() => true,
            _ => {
                scope.error(sink, format!("{path} must be a non-empty string"));
                false
            }
        },
        Shape::Name => match value.as_str() {
            Some(s) if !s.is_empty() => true,
            _ => {
                scope.error(
                    sink,
                    format!("{} has invalid '{field}' field", scope.label()),
                );
                false
            }
        },
        Shape::Integer { min } => check_integer(scope, &path, value, min, sink),
        Shape::Boolean => {
            if matches!(value, JsonNode::Bool(_)) {
                true
            } else {
                scope.error(sink, format!("{path} must be a boolean"));
                false
            }
        }
        Shape::NumberArray(bound) => {
            let Some(items) = value.as_array() else {
                scope.error(sink, format!("{path} must be an array"));
                return false;
            };
            let mut valid = true;
            for (i, item) in items.iter().enumerate() {
                let Some(n) = item.as_number() else {
                    scope.error(sink, format!("{path}[{i}] must be a number"));
                    valid = false;
                    continue;
                };
                let violation = match bound {
                    Bound::NonNegative(severity) if n < 0.0 => Some((severity, ">= 0")),
                    Bound::Positive(severity) if n <= 0.0 => Some((severity, "> 0")),
                    _ => None,
                };
                if let Some((severity, expected)) = violation {
                    sink.report(
                        severity,
                        scope.line,
                        format!("{path}[{i}] must be {expected}, got {item}"),
                    );
                    valid &= severity != Severity::Error;
                }
            }
            valid
        }
        Shape::IntegerArray { range } => check_integer_array(scope, &path, value, range, sink),
        Shape::OneOf(allowed) => match value.as_str() {
            None => {
                scope.error(sink, format!("{path} must be a string"));
                false
            }
            Some(s) if !allowed.contains(&s) => {
                scope.error(
                    sink,
                    format!("{path} must be one of {}, got '{s}'", format_set(allowed)),
                );
                false
            }
            Some(_) => true,
        },
        Shape::OneOfArray(allowed) => {
            let Some(items) = value.as_array() else {
                scope.error(sink, format!("{path} must be an array"));
                return false;
            };
            if items.is_empty() {
                scope.error(sink, format!("{path} must not be empty"));
                return false;
            }
            let mut valid = true;
            for (i, item) in items.iter().enumerate() {
                match item.as_str() {
                    None => {
                        scope.error(sink, format!("{path}[{i}] must be a string"));
                        valid = false;
                    }
                    Some(s) if !allowed.contains(&s) => {
                        scope.error(
                            sink,
                            format!(
                                "{path}[{i}] must be one of {}, got '{s}'",
                                format_set(allowed)
                            ),
                        );
                        valid = false;
                    }
                    Some(_) => {}
                }
            }
            valid
        }
        Shape::NumberMap(allowed) => {
            let Some(map) = value.as_object() else {
                scope.error(sink, format!("{path} must be an object"));
                return false;
            };
            let unexpected: Vec<&str> = map.keys().filter(|k| !allowed.contains(k)).collect();
            if !unexpected.is_empty() {
                scope.warn(
                    sink,
                    format!("{path} has unexpected keys: {}", format_set(&unexpected)),
                );
            }
            let mut valid = true;
            for key in allowed.iter().copied() {
                if let Some(v) = map.get(key) {
                    if v.as_number().is_none() {
                        scope.error(sink, format!("{path}.{key} must be a number"));
                        valid = false;
                    }
                }
            }
            valid
        }
        Shape::Description => {
            match value.as_str() {
                None => scope.warn(sink, format!("{path} must be a string")),
                Some(s) => {
                    let chars = s.chars().count();
                    if chars > DESCRIPTION_MAX_CHARS {
                        scope.warn(
                            sink,
                            format!(
                                "{path} too long (max {DESCRIPTION_MAX_CHARS} chars, got {chars})"
                            ),
                        );
                    }
                }
            }
            true
        }
    }
}

fn check_integer(
    scope: &Scope,
    path: &str,
    value: &JsonNode,
    min: i64,
    sink: &mut IssueSink<'_>,
) -> bool {
    match value.as_integer() {
        None => {
            scope.error(
                sink,
                format!("{path} must be an integer, got {}", value.kind_name()),
            );
            false
        }
        Some(n) if n < min => {
            scope.error(sink, format!("{path} must be >= {min}, got {n}"));
            false
        }
        Some(_) => true,
    }
}

fn check_integer_array(
    scope: &Scope,
    path: &str,
    value: &JsonNode,
    range: Option<(i64, i64)>,
    sink: &mut IssueSink<'_>,
) -> bool {
    let Some(items) = value.as_array() else {
        scope.error(sink, format!("{path} must be an array"));
        return false;
    };
    let mut valid = true;
    for (i, item) in items.iter().enumerate() {
        match (item.as_integer(), range) {
            (None, _) => {
                scope.error(sink, format!("{path}[{i}] must be an integer"));
                valid = false;
            }
            (Some(n), Some((low, high))) if n < low || n > high => {
                scope.error(sink, format!("{path}[{i}] must be {low}-{high}, got {n}"));
                valid = false;
            }
            _ => {}
        }
    }
    valid
}

/// When the `_max` sibling of a stat array is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxPolicy {
    /// Only when the stat array itself is present.
    WhenValuePresent,
    /// Always; the stat array is required too.
    Always,
}

/// A stat array paired with the field holding its maximum.
///
/// Hero skills (`damage` / `damage_max`), hero status effects (`effect` /
/// `max`) and official stats (`intelligence` / `intelligence_max`) all
/// follow this pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedStat {
    /// Field holding the per-level integer array.
    pub value: &'static str,
    /// Field holding the non-negative maximum.
    pub max: &'static str,
    /// Inclusive range for each element of the value array.
    pub range: Option<(i64, i64)>,
    /// When `max` is required.
    pub policy: MaxPolicy,
}

impl PairedStat {
    /// A stat whose `<value>_max` sibling is required only when `value` is present.
    #[must_use]
    pub const fn conditional(value: &'static str, max: &'static str) -> Self {
        Self {
            value,
            max,
            range: None,
            policy: MaxPolicy::WhenValuePresent,
        }
    }

    /// Restrict each element of the value array to `low..=high`.
    #[must_use]
    pub const fn with_range(mut self, low: i64, high: i64) -> Self {
        self.range = Some((low, high));
        self
    }

    /// Require both fields unconditionally.
    #[must_use]
    pub const fn always(value: &'static str, max: &'static str) -> Self {
        Self {
            value,
            max,
            range: None,
            policy: MaxPolicy::Always,
        }
    }
}

/// Check the value array of `pair` only. Returns `true` if no ERROR was recorded.
pub fn check_paired_value(
    scope: &Scope,
    obj: &JsonObject,
    pair: &PairedStat,
    sink: &mut IssueSink<'_>,
) -> bool {
    match obj.get(pair.value) {
        Some(value) => check_integer_array(scope, &scope.path(pair.value), value, pair.range, sink),
        None if pair.policy == MaxPolicy::Always => {
            scope.missing(sink, pair.value);
            false
        }
        None => true,
    }
}

/// Check the `max` sibling of `pair` only. Returns `true` if no ERROR was recorded.
pub fn check_paired_max(
    scope: &Scope,
    obj: &JsonObject,
    pair: &PairedStat,
    sink: &mut IssueSink<'_>,
) -> bool {
    if pair.policy == MaxPolicy::WhenValuePresent && !obj.contains_key(pair.value) {
        return true;
    }
    match obj.get(pair.max) {
        Some(max) => check_integer(scope, &scope.path(pair.max), max, 0, sink),
        None => {
            match pair.policy {
                MaxPolicy::WhenValuePresent => scope.error(
                    sink,
                    format!(
                        "{} with '{}' is missing required field '{}'",
                        scope.label,
                        pair.value,
                        scope.qualified(pair.max)
                    ),
                ),
                MaxPolicy::Always => scope.missing(sink, pair.max),
            }
            false
        }
    }
}

/// Check a group of paired stats: every value array first, then every max.
/// Returns `true` if no ERROR was recorded.
pub fn paired_requirement(
    scope: &Scope,
    obj: &JsonObject,
    pairs: &[PairedStat],
    sink: &mut IssueSink<'_>,
) -> bool {
    let mut valid = true;
    for pair in pairs {
        valid &= check_paired_value(scope, obj, pair, sink);
    }
    for pair in pairs {
        valid &= check_paired_max(scope, obj, pair, sink);
    }
    valid
}

/// Check an entity ID against the naming convention.
///
/// Empty IDs and IDs containing anything other than alphanumerics, `_` and
/// `-` are ERRORs. IDs not starting with a letter are WARNs, as are IDs that
/// are not lowercase: an ID needs at least one cased letter and no uppercase
/// ones, so `"123"` also warns. Returns `false` if an ERROR was recorded.
pub fn check_id_naming(kind: EntityKind, id: &str, line: usize, sink: &mut IssueSink<'_>) -> bool {
    let Some(first) = id.chars().next() else {
        sink.error_at(line, format!("Empty {} ID", kind.noun()));
        return false;
    };

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        sink.error_at(
            line,
            format!("{} ID '{id}' contains invalid characters", kind.label()),
        );
        return false;
    }

    if !first.is_alphabetic() {
        sink.warn_at(
            line,
            format!("{} ID '{id}' should start with a letter", kind.label()),
        );
    }

    let has_lowercase = id.chars().any(char::is_lowercase);
    if !has_lowercase || id.chars().any(char::is_uppercase) {
        sink.warn_at(
            line,
            format!(
                "{} ID '{id}' should be lowercase{}",
                kind.label(),
                kind.lowercase_hint()
            ),
        );
    }

    true
}

/// Render names as a sorted list, e.g. `['magical', 'ranged']`.
#[must_use]
pub fn format_set<S: AsRef<str>>(items: &[S]) -> String {
    let mut sorted: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let quoted: Vec<String> = sorted.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}
