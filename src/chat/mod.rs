//! Interactive chat front-end over the retrieval service

pub mod session;

pub use session::{ChatSession, ChatTurn};

use std::io::{BufRead, Write};

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::generation::{prompt::clean_query, AnswerComposer};
use crate::retrieval::RetrievalService;

/// Run the interactive session loop on stdin/stdout
///
/// Errors from the layers below are shown as plain-language messages and
/// the session continues; only a failure to write the history log ends it.
pub async fn run(
    service: &RetrievalService,
    composer: &AnswerComposer,
    config: &ChatConfig,
) -> Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    print!("Your name: ");
    std::io::stdout().flush()?;
    let user = match lines.next() {
        Some(line) => {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                "anonymous".to_string()
            } else {
                trimmed.to_string()
            }
        }
        None => return Ok(()),
    };

    let mut session = ChatSession::start(&user, composer.model(), &config.sessions_dir)?;
    println!(
        "\nHello {}! Ask me about the policy document. Type 'exit' to quit.\n",
        user
    );

    loop {
        print!("{}> ", user);
        std::io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match answer_question(service, composer, question).await {
            Ok(answer) => {
                println!("\n{}\n", answer);
                session.record(question, &answer)?;
            }
            Err(e) => {
                println!("\n{}\n", describe_error(&e));
                tracing::error!("Failed to answer '{}': {}", question, e);
            }
        }
    }

    println!(
        "Goodbye {}! ({} questions this session)",
        user,
        session.history().len()
    );
    Ok(())
}

/// Retrieve passages for a question and compose the final answer
async fn answer_question(
    service: &RetrievalService,
    composer: &AnswerComposer,
    question: &str,
) -> Result<String> {
    let results = service.query(&clean_query(question)).await?;
    composer.answer(question, &results).await
}

/// Plain-language rendering for the session loop
fn describe_error(error: &Error) -> String {
    match error {
        Error::ProviderUnavailable(_) => {
            "Sorry, I can't reach the language model right now. \
             Check that Ollama is running and try again."
                .to_string()
        }
        Error::EmbeddingFailure(_) => {
            "Sorry, I couldn't process that question. Please try again.".to_string()
        }
        Error::CorruptIndex { path, .. } => format!(
            "The stored index at '{}' is unreadable. Delete it and restart to rebuild.",
            path
        ),
        other => format!("Sorry, something went wrong: {}", other),
    }
}
