//! In-memory survey draft edited by the manual builder.

use super::{Question, QuestionType};

/// Options every new choice/dropdown question starts with.
pub const DEFAULT_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

/// Ordered question list for the survey being designed.
#[derive(Debug, Default)]
pub struct SurveyDraft {
    next_id: u64,
    questions: Vec<Question>,
}

impl SurveyDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a placeholder question of `kind` and return its id.
    pub fn add_question(&mut self, kind: QuestionType) -> String {
        let id = self.fresh_id();
        let options = if kind.has_options() {
            DEFAULT_OPTIONS.iter().map(|o| o.to_string()).collect()
        } else {
            Vec::new()
        };
        self.questions.push(Question {
            id: id.clone(),
            kind,
            question: format!("New {} question", kind.as_str().replacen('-', " ", 1)),
            required: false,
            options,
        });
        id
    }

    /// Remove the question with `id`.  Returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        self.questions.len() != before
    }

    /// Append generated questions.  Blank or clashing ids are replaced so
    /// every id in the draft stays unique.
    pub fn import(&mut self, generated: impl IntoIterator<Item = Question>) -> usize {
        let mut added = 0;
        for mut question in generated {
            if question.id.trim().is_empty() || self.contains(&question.id) {
                question.id = self.fresh_id();
            }
            self.questions.push(question);
            added += 1;
        }
        added
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn contains(&self, id: &str) -> bool {
        self.questions.iter().any(|q| q.id == id)
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("q{}", self.next_id);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(id: &str, kind: QuestionType) -> Question {
        Question {
            id: id.into(),
            kind,
            question: "Generated".into(),
            required: true,
            options: Vec::new(),
        }
    }

    #[test]
    fn choice_types_get_default_options() {
        let mut draft = SurveyDraft::new();
        draft.add_question(QuestionType::MultipleChoice);
        draft.add_question(QuestionType::Dropdown);
        draft.add_question(QuestionType::Number);

        let q = draft.questions();
        assert_eq!(q[0].question, "New multiple choice question");
        assert_eq!(q[0].options, DEFAULT_OPTIONS);
        assert_eq!(q[1].options, DEFAULT_OPTIONS);
        assert!(q[2].options.is_empty());
        assert!(q.iter().all(|q| !q.required));
    }

    #[test]
    fn remove_only_drops_matching_id() {
        let mut draft = SurveyDraft::new();
        let a = draft.add_question(QuestionType::Text);
        let b = draft.add_question(QuestionType::Date);

        assert!(draft.remove(&a));
        assert!(!draft.remove(&a));
        assert_eq!(draft.questions().len(), 1);
        assert_eq!(draft.questions()[0].id, b);
    }

    #[test]
    fn import_appends_and_keeps_ids_unique() {
        let mut draft = SurveyDraft::new();
        let first = draft.add_question(QuestionType::Text);

        let added = draft.import(vec![
            generated(&first, QuestionType::Rating),
            generated("", QuestionType::Date),
            generated("household-size", QuestionType::Number),
        ]);

        assert_eq!(added, 3);
        let ids: Vec<&str> = draft.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[3], "household-size");
        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 4);
        assert_eq!(draft.questions()[1].kind, QuestionType::Rating);
    }
}
