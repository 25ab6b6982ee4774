use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use polybase_core::{CourseId, DomainError, Entity};

/// Teaching semester a course belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Semester {
    S1,
    S2,
}

impl Semester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::S1 => "S1",
            Semester::S2 => "S2",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Semester {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(DomainError::format("semester cannot be empty")),
            "S1" => Ok(Semester::S1),
            "S2" => Ok(Semester::S2),
            other => Err(DomainError::format(format!(
                "semester must be either S1 or S2, got {other:?}"
            ))),
        }
    }
}

/// Closed vocabulary of course material kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseKind {
    #[serde(rename = "TD")]
    Td,
    Cours,
    Memento,
    #[serde(rename = "TME")]
    Tme,
}

impl CourseKind {
    pub const ALL: [CourseKind; 4] = [
        CourseKind::Td,
        CourseKind::Cours,
        CourseKind::Memento,
        CourseKind::Tme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseKind::Td => "TD",
            CourseKind::Cours => "Cours",
            CourseKind::Memento => "Memento",
            CourseKind::Tme => "TME",
        }
    }

    /// Position of the kind inside a pack listing (lower comes first).
    pub fn priority(&self) -> u8 {
        match self {
            CourseKind::Memento => 1,
            CourseKind::Tme => 2,
            CourseKind::Cours => 3,
            CourseKind::Td => 4,
        }
    }

    /// Priority of a raw kind string; unknown kinds sort after every known one.
    pub fn priority_of(kind: &str) -> u8 {
        kind.parse::<CourseKind>().map(|k| k.priority()).unwrap_or(5)
    }
}

impl fmt::Display for CourseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::format("kind must be one of: TD, Cours, Memento, TME"))
    }
}

/// One piece of course material.
///
/// `parts` is derived: the store keeps it equal to the highest `part` among
/// every course sharing the same `(code, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(flatten)]
    pub id: CourseId,
    pub parts: i64,
    pub name: String,
    pub quantity: i64,
    pub total: i64,
    pub shown: bool,
    pub semester: Semester,
}

impl Course {
    /// Build a visible course; `parts` is filled in by the store.
    pub fn new(
        id: CourseId,
        name: impl Into<String>,
        quantity: i64,
        total: i64,
        semester: Semester,
    ) -> Self {
        Self {
            id,
            parts: 0,
            name: name.into(),
            quantity,
            total,
            shown: true,
            semester,
        }
    }
}

impl Entity for Course {
    const NOUN: &'static str = "course";
    type Id = CourseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update envelope for a course.
///
/// `parts` has no counterpart: it is derived, never written by callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCourse {
    pub code: Option<String>,
    pub kind: Option<String>,
    pub part: Option<i64>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub total: Option<i64>,
    pub shown: Option<bool>,
    pub semester: Option<Semester>,
}

impl PartialCourse {
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.kind.is_none()
            && self.part.is_none()
            && self.name.is_none()
            && self.quantity.is_none()
            && self.total.is_none()
            && self.shown.is_none()
            && self.semester.is_none()
    }

    pub fn touches_identity(&self) -> bool {
        self.code.is_some() || self.kind.is_some() || self.part.is_some()
    }

    /// Overlay the set fields onto `current`. The result is not validated.
    pub fn merge_onto(&self, current: &Course) -> Course {
        let mut merged = current.clone();
        if let Some(code) = &self.code {
            merged.id.code = code.clone();
        }
        if let Some(kind) = &self.kind {
            merged.id.kind = kind.clone();
        }
        if let Some(part) = self.part {
            merged.id.part = part;
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            merged.quantity = quantity;
        }
        if let Some(total) = self.total {
            merged.total = total;
        }
        if let Some(shown) = self.shown {
            merged.shown = shown;
        }
        if let Some(semester) = self.semester {
            merged.semester = semester;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Course {
        Course::new(
            CourseId::new("LU3IN005", "TD", 1),
            "Algorithmique",
            30,
            50,
            Semester::S1,
        )
    }

    #[test]
    fn new_course_is_shown() {
        let course = sample();
        assert!(course.shown);
        assert_eq!(course.parts, 0);
        assert_eq!(course.label(), "course LU3IN005/TD/1");
    }

    #[test]
    fn semester_parses_trimmed_values() {
        assert_eq!(" S2 ".parse::<Semester>().unwrap(), Semester::S2);
        assert!(matches!("".parse::<Semester>(), Err(DomainError::Format(_))));
        assert!(matches!("S3".parse::<Semester>(), Err(DomainError::Format(_))));
    }

    #[test]
    fn kind_vocabulary_is_closed() {
        for kind in CourseKind::ALL {
            assert_eq!(kind.as_str().parse::<CourseKind>().unwrap(), kind);
        }
        assert!("Exam".parse::<CourseKind>().is_err());
        assert!("td".parse::<CourseKind>().is_err());
    }

    #[test]
    fn unknown_kinds_sort_last() {
        assert!(CourseKind::priority_of("Memento") < CourseKind::priority_of("TD"));
        assert_eq!(CourseKind::priority_of("Exam"), 5);
    }

    #[test]
    fn empty_envelope_is_detected() {
        assert!(PartialCourse::default().is_empty());
        let partial = PartialCourse {
            shown: Some(false),
            ..Default::default()
        };
        assert!(!partial.is_empty());
        assert!(!partial.touches_identity());
    }

    #[test]
    fn merge_overlays_only_set_fields() {
        let partial = PartialCourse {
            code: Some("LU3IN006".to_string()),
            quantity: Some(12),
            ..Default::default()
        };
        assert!(partial.touches_identity());

        let merged = partial.merge_onto(&sample());
        assert_eq!(merged.id, CourseId::new("LU3IN006", "TD", 1));
        assert_eq!(merged.quantity, 12);
        assert_eq!(merged.total, 50);
        assert_eq!(merged.name, "Algorithmique");
    }

    #[test]
    fn course_serializes_with_flat_identity() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["code"], "LU3IN005");
        assert_eq!(value["kind"], "TD");
        assert_eq!(value["part"], 1);
        assert_eq!(value["semester"], "S1");

        let back: Course = serde_json::from_value(value).unwrap();
        assert_eq!(back, sample());
    }
}
