//! Background task serving generation requests from the UI.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{GenerateError, Question, QuestionGenerator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyCommand {
    Generate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyEvent {
    Generated(Vec<Question>),
    /// Message ready for display.
    Failed(String),
}

/// Answer each request in order until `commands` closes.
pub async fn run_generator(
    generator: Arc<dyn QuestionGenerator>,
    mut commands: mpsc::Receiver<SurveyCommand>,
    events: mpsc::Sender<SurveyEvent>,
) {
    while let Some(SurveyCommand::Generate(prompt)) = commands.recv().await {
        let event = match generator.generate(&prompt).await {
            Ok(questions) => SurveyEvent::Generated(questions),
            Err(e) => {
                match &e {
                    GenerateError::EmptyPrompt => log::debug!("survey: {e}"),
                    _ => log::error!("survey: {e}"),
                }
                SurveyEvent::Failed(e.user_message())
            }
        };
        if events.send(event).await.is_err() {
            break;
        }
    }

    log::info!("survey: command channel closed, generator shutting down");
}
