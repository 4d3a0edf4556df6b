//! Conflict gate guarding possibly hand-edited files.

use cmdgen_core::ArtifactDescriptor;

/// Outcome of a conflict check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing exists at the target path; writing is safe.
    NoConflict,
    /// A regular file already exists; a human has to decide.
    Conflict {
        /// Question to present, naming the exact target path.
        question: String,
    },
}

impl Verdict {
    /// Whether the check found an existing file.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Verdict::Conflict { .. })
    }
}

/// Check whether writing `descriptor` would clobber an existing regular file.
pub fn check_conflict(descriptor: &ArtifactDescriptor) -> Verdict {
    if descriptor.target_path.is_file() {
        Verdict::Conflict {
            question: overwrite_question(descriptor),
        }
    } else {
        Verdict::NoConflict
    }
}

/// The overwrite question for a descriptor.
pub fn overwrite_question(descriptor: &ArtifactDescriptor) -> String {
    format!(
        "Should I overwrite the file \"{}\"?",
        descriptor.target_path.display()
    )
}

/// Interpret a free-text answer. Anything not recognised as yes means no.
pub fn parse_answer(answer: &str) -> bool {
    const YES: &[&str] = &[
        "yes", "y", "ja", "j", "ok", "okay", "sure", "yep", "yeah", "true", "1",
    ];
    let answer = answer.trim().trim_end_matches(['!', '.']).to_lowercase();
    YES.contains(&answer.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgen_core::ArtifactKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_no_conflict() {
        let temp = TempDir::new().unwrap();
        let descriptor =
            ArtifactDescriptor::new(ArtifactKind::Schema, temp.path().join("A-schema.json"), "{}");
        assert_eq!(check_conflict(&descriptor), Verdict::NoConflict);
    }

    #[test]
    fn test_existing_file_raises_question_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("A-schema.json");
        std::fs::write(&path, "{}").unwrap();

        let descriptor = ArtifactDescriptor::new(ArtifactKind::Schema, &path, "{}");
        match check_conflict(&descriptor) {
            Verdict::Conflict { question } => {
                assert_eq!(
                    question,
                    format!("Should I overwrite the file \"{}\"?", path.display())
                );
            }
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_not_a_conflict() {
        let temp = TempDir::new().unwrap();
        let descriptor = ArtifactDescriptor::new(ArtifactKind::Schema, temp.path(), "{}");
        assert!(!check_conflict(&descriptor).is_conflict());
    }

    #[test]
    fn test_parse_answer() {
        for yes in ["yes", " Y ", "Ja", "ok!", "sure.", "1"] {
            assert!(parse_answer(yes), "{yes:?} should be yes");
        }
        for no in ["no", "n", "", "nope", "maybe"] {
            assert!(!parse_answer(no), "{no:?} should be no");
        }
    }
}
