use crate::model::face::DetectedFace;
use crate::model::notification::NotificationType;
use crate::remote::client::RecognitionOutcome;
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

pub const ALREADY_MARKED_TITLE: &str = "Attendance Already Marked";

/// Primary category of one face. Declaration order is priority order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema, Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FaceCategory {
    Spoofed,
    AlreadyMarked,
    Marked,
    Unmarked,
    Unknown,
}

impl FaceCategory {
    pub fn of(face: &DetectedFace) -> Self {
        if face.is_spoofed() {
            FaceCategory::Spoofed
        } else if face.attendance_already_marked {
            FaceCategory::AlreadyMarked
        } else if face.attendance_marked {
            FaceCategory::Marked
        } else if face.is_unknown() {
            FaceCategory::Unknown
        } else {
            FaceCategory::Unmarked
        }
    }

    pub fn level(self) -> NotificationType {
        match self {
            FaceCategory::Spoofed => NotificationType::Error,
            FaceCategory::AlreadyMarked => NotificationType::Info,
            FaceCategory::Marked => NotificationType::Success,
            FaceCategory::Unmarked | FaceCategory::Unknown => NotificationType::Warning,
        }
    }

    fn title(self) -> &'static str {
        match self {
            FaceCategory::Spoofed => "Spoof Detected",
            FaceCategory::AlreadyMarked => ALREADY_MARKED_TITLE,
            FaceCategory::Marked => "Attendance Marked",
            FaceCategory::Unmarked => "Attendance Not Marked",
            FaceCategory::Unknown => "Unknown Faces",
        }
    }

    fn message(self, count: usize) -> String {
        let who = if count == 1 {
            "1 face".to_string()
        } else {
            format!("{count} faces")
        };
        match self {
            FaceCategory::Spoofed => format!("{who} failed the liveness check"),
            FaceCategory::AlreadyMarked => format!("{who} already marked for this period"),
            FaceCategory::Marked => format!("Attendance recorded for {who}"),
            FaceCategory::Unmarked => format!("{who} recognized but not recorded"),
            FaceCategory::Unknown => format!("{who} not recognized"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Toast {
    pub level: NotificationType,
    pub title: String,
    pub message: String,
    pub retryable: bool,
}

impl Toast {
    pub fn new(level: NotificationType, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
            retryable: false,
        }
    }
}

/// Blocking confirmation shown on top of the toasts.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Dialog {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresentedFace {
    #[serde(flatten)]
    pub face: DetectedFace,
    pub category: FaceCategory,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryGroup {
    pub category: FaceCategory,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ScanReport {
    pub faces: Vec<PresentedFace>,
    /// Non-empty categories in priority order.
    pub categories: Vec<CategoryGroup>,
    pub toasts: Vec<Toast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog: Option<Dialog>,
}

impl ScanReport {
    pub fn has(&self, category: FaceCategory) -> bool {
        self.categories.iter().any(|g| g.category == category)
    }
}

pub fn present(outcome: RecognitionOutcome) -> ScanReport {
    let faces = match outcome {
        RecognitionOutcome::NoFaces { message } => {
            return ScanReport {
                toasts: vec![Toast::new(
                    NotificationType::Info,
                    "No Faces",
                    message.unwrap_or_else(|| "No students detected".into()),
                )],
                ..Default::default()
            };
        }
        RecognitionOutcome::Rejected { message } => {
            return ScanReport {
                toasts: vec![Toast::new(NotificationType::Info, "No Faces", message)],
                ..Default::default()
            };
        }
        RecognitionOutcome::Faces(faces) => faces,
    };

    let faces: Vec<PresentedFace> = faces
        .into_iter()
        .map(|face| PresentedFace {
            category: FaceCategory::of(&face),
            face,
        })
        .collect();

    let mut categories: Vec<CategoryGroup> = Vec::new();
    for f in &faces {
        match categories.iter_mut().find(|g| g.category == f.category) {
            Some(group) => group.labels.push(f.face.label()),
            None => categories.push(CategoryGroup {
                category: f.category,
                labels: vec![f.face.label()],
            }),
        }
    }
    // stable: labels keep response order inside each group
    categories.sort_by_key(|g| g.category);

    let toasts = categories
        .iter()
        .map(|g| {
            Toast::new(
                g.category.level(),
                g.category.title(),
                g.category.message(g.labels.len()),
            )
        })
        .collect();

    // every already-marked identity, whatever its primary category
    let already: Vec<String> = faces
        .iter()
        .filter(|f| f.face.attendance_already_marked)
        .map(|f| f.face.label())
        .collect();
    let dialog = (!already.is_empty()).then(|| Dialog {
        title: ALREADY_MARKED_TITLE.to_string(),
        items: already,
    });

    ScanReport {
        faces,
        categories,
        toasts,
        dialog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(name: &str, roll: &str) -> DetectedFace {
        DetectedFace {
            name: name.into(),
            roll_number: roll.into(),
            spoofed: false,
            emotion: "Neutral".into(),
            recognition_confidence: Some(90.0),
            liveness_confidence: Some(90.0),
            is_live: Some(true),
            attendance_marked: false,
            attendance_already_marked: false,
        }
    }

    #[test]
    fn spoofed_comes_first_and_dialog_still_lists_already_marked() {
        let mut spoof = face("Ravi Kumar", "S010");
        spoof.spoofed = true;
        let mut already = face("Sreyan Panda", "S004");
        already.attendance_already_marked = true;

        let report = present(RecognitionOutcome::Faces(vec![already, spoof]));

        assert_eq!(report.categories[0].category, FaceCategory::Spoofed);
        assert!(report.has(FaceCategory::AlreadyMarked));
        assert_eq!(report.toasts.len(), 2);
        assert_eq!(report.toasts[0].level, NotificationType::Error);

        let dialog = report.dialog.unwrap();
        assert_eq!(dialog.title, "Attendance Already Marked");
        assert_eq!(dialog.items, vec!["Sreyan Panda (S004)".to_string()]);
    }

    #[test]
    fn liveness_failure_outranks_already_marked_but_dialog_keeps_the_face() {
        let mut f = face("Ravi Kumar", "S010");
        f.is_live = Some(false);
        f.attendance_already_marked = true;

        let report = present(RecognitionOutcome::Faces(vec![f]));
        assert_eq!(report.faces[0].category, FaceCategory::Spoofed);
        assert_eq!(report.toasts.len(), 1);
        assert_eq!(report.toasts[0].level, NotificationType::Error);

        let dialog = report.dialog.unwrap();
        assert_eq!(dialog.items, vec!["Ravi Kumar (S010)".to_string()]);
    }

    #[test]
    fn one_toast_per_category_not_per_face() {
        let mut a = face("A", "S001");
        a.attendance_marked = true;
        let mut b = face("B", "S002");
        b.attendance_marked = true;
        let unknown = face("Unknown", "N/A");

        let report = present(RecognitionOutcome::Faces(vec![a, unknown, b]));
        let levels: Vec<_> = report.toasts.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![NotificationType::Success, NotificationType::Warning]);
        assert_eq!(report.toasts[0].message, "Attendance recorded for 2 faces");
        assert_eq!(report.categories[0].labels, vec!["A (S001)", "B (S002)"]);
    }

    #[test]
    fn rejection_is_an_info_toast() {
        let report = present(RecognitionOutcome::Rejected {
            message: "No faces".into(),
        });
        assert!(report.faces.is_empty());
        assert_eq!(report.toasts.len(), 1);
        assert_eq!(report.toasts[0].level, NotificationType::Info);
        assert_eq!(report.toasts[0].message, "No faces");
        assert!(report.dialog.is_none());
    }

    #[test]
    fn empty_face_list_reads_no_students_detected() {
        let report = present(RecognitionOutcome::NoFaces { message: None });
        assert_eq!(report.toasts[0].title, "No Faces");
        assert_eq!(report.toasts[0].message, "No students detected");
    }
}
