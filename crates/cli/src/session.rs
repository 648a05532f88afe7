//! Interactive question/answer loop.
//!
//! Reads one question per line and prints the guide's answer. Each turn runs
//! as its own task so a panic inside the pipeline is reported instead of
//! ending the session.

use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::pipeline::{Outcome, Responder};

/// Inputs that end the session (compared case-insensitively).
pub const EXIT_COMMANDS: &[&str] = &["quit", "exit", "thoát", "q"];

pub const GREETING: &str = "Xin chào! I am your guide to the culture of Huế.\n\
Ask me about its history, monuments, festivals, food or crafts.\n\
Type 'quit', 'exit', 'thoát' or 'q' to leave.\n";

pub const FAREWELL: &str = "Goodbye, hẹn gặp lại!";

const PROMPT: &str = "\nYou: ";
const ANSWER_PREFIX: &str = "Guide: ";

/// Whether `line` is a termination command.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim().to_lowercase();
    EXIT_COMMANDS.contains(&line.as_str())
}

/// Counters for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub questions: usize,
    pub answered: usize,
    pub failed_turns: usize,
}

/// Run the loop until a termination command or end of input.
pub async fn run_session<P, I, O>(responder: Arc<Mutex<P>>, input: I, output: &mut O) -> io::Result<SessionSummary>
where
    P: Responder + ?Sized + 'static,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut summary = SessionSummary::default();
    let mut lines = input.lines();

    output.write_all(GREETING.as_bytes()).await?;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let question = line.trim().to_string();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(&question) {
            break;
        }

        summary.questions += 1;

        let turn = {
            let responder = responder.clone();
            let question = question.clone();
            tokio::spawn(async move { responder.lock().await.ask(&question).await })
        };

        match turn.await {
            Ok(reply) => {
                if reply.outcome == Outcome::Answered {
                    summary.answered += 1;
                }
                tracing::debug!(
                    outcome = ?reply.outcome,
                    search_ms = reply.timings.search.as_millis() as u64,
                    extract_ms = reply.timings.extract.as_millis() as u64,
                    generate_ms = reply.timings.generate.as_millis() as u64,
                    total_ms = reply.timings.total.as_millis() as u64,
                    "turn complete"
                );
                output.write_all(format!("\n{ANSWER_PREFIX}{}\n", reply.answer).as_bytes()).await?;
            }
            Err(e) => {
                summary.failed_turns += 1;
                tracing::error!(error = %e, "turn failed");
                output
                    .write_all(format!("\nSorry, something went wrong with that question: {e}\n").as_bytes())
                    .await?;
            }
        }
    }

    output.write_all(format!("\n{FAREWELL}\n").as_bytes()).await?;
    output.flush().await?;

    tracing::debug!(questions = summary.questions, answered = summary.answered, "session ended");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Reply, StageTimings};
    use async_trait::async_trait;

    /// Echoes questions back; panics on "boom".
    #[derive(Default)]
    struct EchoResponder {
        asked: Vec<String>,
    }

    #[async_trait]
    impl Responder for EchoResponder {
        async fn ask(&mut self, question: &str) -> Reply {
            if question == "boom" {
                panic!("pipeline exploded");
            }
            self.asked.push(question.to_string());
            Reply { answer: format!("echo: {question}"), outcome: Outcome::Answered, timings: StageTimings::default() }
        }
    }

    async fn run(input: &str) -> (String, SessionSummary, Vec<String>) {
        let responder = Arc::new(Mutex::new(EchoResponder::default()));
        let mut output = Vec::new();

        let summary = run_session(responder.clone(), input.as_bytes(), &mut output).await.unwrap();

        let asked = responder.lock().await.asked.clone();
        (String::from_utf8(output).unwrap(), summary, asked)
    }

    #[test]
    fn test_exit_commands() {
        for cmd in ["quit", "EXIT", "  Thoát ", "Q", "THOÁT"] {
            assert!(is_exit_command(cmd), "{cmd}");
        }
        for cmd in ["quite", "q?", "", "exit now"] {
            assert!(!is_exit_command(cmd), "{cmd}");
        }
    }

    #[tokio::test]
    async fn test_answers_until_quit() {
        let (output, summary, asked) = run("Đại Nội ở đâu?\n\n   \nLăng Tự Đức?\nquit\nnever asked\n").await;

        assert_eq!(asked, vec!["Đại Nội ở đâu?", "Lăng Tự Đức?"]);
        assert_eq!(summary, SessionSummary { questions: 2, answered: 2, failed_turns: 0 });
        assert!(output.starts_with(GREETING));
        assert!(output.contains("Guide: echo: Đại Nội ở đâu?"));
        assert!(output.contains("Guide: echo: Lăng Tự Đức?"));
        assert!(output.trim_end().ends_with(FAREWELL));
    }

    #[tokio::test]
    async fn test_eof_ends_session() {
        let (output, summary, asked) = run("Chè Huế").await;

        assert_eq!(asked, vec!["Chè Huế"]);
        assert_eq!(summary.questions, 1);
        assert!(output.contains(FAREWELL));
    }

    #[tokio::test]
    async fn test_panicking_turn_is_reported() {
        let (output, summary, asked) = run("boom\nNón lá\n").await;

        assert_eq!(summary, SessionSummary { questions: 2, answered: 1, failed_turns: 1 });
        assert_eq!(asked, vec!["Nón lá"]);
        assert!(output.contains("Sorry, something went wrong"));
        assert!(output.contains("Guide: echo: Nón lá"));
    }
}
