//! Asking the user for input mid-operation.

use crate::core::error::{FlowNavigatorError, Result};
use async_trait::async_trait;
use colored::Colorize;
use std::io::{BufRead, Write};

#[async_trait]
pub trait Prompter: Send + Sync {
    /// Free-text input. `None` when the user dismissed the prompt.
    async fn input(&self, prompt: &str) -> Result<Option<String>>;

    /// Pick one of `options`. `None` when the user dismissed the prompt.
    async fn select(&self, prompt: &str, options: &[String]) -> Result<Option<String>>;
}

/// Prompts on stderr and reads answers from stdin. An empty answer dismisses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

fn read_answer(question: String) -> Result<Option<String>> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{question}")?;
    stderr.flush()?;

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

async fn ask(question: String) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || read_answer(question))
        .await
        .map_err(|e| FlowNavigatorError::Io(std::io::Error::other(e)))?
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn input(&self, prompt: &str) -> Result<Option<String>> {
        ask(format!("{} ", format!("{prompt}:").bold())).await
    }

    async fn select(&self, prompt: &str, options: &[String]) -> Result<Option<String>> {
        let mut question = format!("{}\n", prompt.bold());
        for (i, option) in options.iter().enumerate() {
            question.push_str(&format!("  {} {}\n", format!("{}.", i + 1).bright_black(), option));
        }
        question.push_str("Choice: ");

        let Some(answer) = ask(question).await? else {
            return Ok(None);
        };
        Ok(pick_option(&answer, options))
    }
}

/// Accepts a 1-based index or an exact option name.
fn pick_option(answer: &str, options: &[String]) -> Option<String> {
    if let Ok(index) = answer.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .cloned();
    }
    options.iter().find(|o| o.as_str() == answer).cloned()
}

/// Used when prompting is disabled: every prompt is dismissed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractivePrompter;

#[async_trait]
impl Prompter for NonInteractivePrompter {
    async fn input(&self, prompt: &str) -> Result<Option<String>> {
        log::debug!("Skipping prompt '{prompt}' (non-interactive)");
        Ok(None)
    }

    async fn select(&self, prompt: &str, _options: &[String]) -> Result<Option<String>> {
        log::debug!("Skipping prompt '{prompt}' (non-interactive)");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["login".to_string(), "api".to_string()]
    }

    #[test]
    fn test_pick_option_by_index_and_name() {
        assert_eq!(pick_option("2", &options()).as_deref(), Some("api"));
        assert_eq!(pick_option("login", &options()).as_deref(), Some("login"));
        assert_eq!(pick_option("0", &options()), None);
        assert_eq!(pick_option("3", &options()), None);
        assert_eq!(pick_option("nope", &options()), None);
    }

    #[tokio::test]
    async fn test_non_interactive_dismisses() -> Result<()> {
        let prompter = NonInteractivePrompter;
        assert_eq!(prompter.input("Tag message").await?, None);
        assert_eq!(prompter.select("Branch", &options()).await?, None);
        Ok(())
    }
}
