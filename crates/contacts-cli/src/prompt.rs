//! Line-oriented terminal prompt
//!
//! One shared reader over stdin, so dialogs, the import confirmation and the
//! interactive session never compete for input.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

pub struct Prompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Print `question` and read one trimmed line; `None` on end of input
    pub async fn ask(&self, question: &str) -> Option<String> {
        print!("{}", question);
        let _ = std::io::stdout().flush();

        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) | Err(_) => None,
        }
    }

    /// Ask a yes/no question; anything but `y`/`yes` is a no
    pub async fn confirm(&self, question: &str) -> bool {
        matches!(
            self.ask(question).await.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        )
    }
}
