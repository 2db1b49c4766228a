//! A UiHost that records every notice and answers questions from a script

use idanalysis_rs::workbench::{Notice, Severity, UiHost};

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub notices: Vec<Notice>,
    pub questions: Vec<(String, String)>,
    pub answer: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that agrees to every question
    pub fn agreeing() -> Self {
        Self {
            answer: true,
            ..Self::default()
        }
    }

    pub fn warnings(&self) -> Vec<&Notice> {
        self.notices
            .iter()
            .filter(|n| n.severity == Severity::Warning)
            .collect()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.notices.iter().map(|n| n.title.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
        self.questions.clear();
    }
}

impl UiHost for RecordingHost {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn confirm(&mut self, title: &str, question: &str) -> bool {
        self.questions.push((title.to_string(), question.to_string()));
        self.answer
    }
}
