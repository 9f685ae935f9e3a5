// edit.rs — Terminal editing surface.
//
// A line-oriented stand-in for the editor window: it holds no file system
// access of its own and drives a SessionController over the in-process
// channel bridge. Pickers and discard prompts are answered on the same
// terminal. `--file` answers the first open picker in advance.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};

use quire_bridge::{channel, BridgeHost, FileBridge, TimeoutBridge};
use quire_fs::FileService;
use quire_protocol::{FileChanged, Outcome, Payload, Response};
use quire_session::{ActionOutcome, SessionController, SessionError};

use crate::config::QuireConfig;
use crate::language::language_for_extension;
use crate::terminal::{Terminal, TerminalConfirmer, TerminalPicker};

const HELP: &str = "\
commands:
  open              pick a file and open it
  show              print the buffer
  set <text>        replace the buffer
  append <text>     add a line to the buffer
  save              write the buffer to its file
  save-as           pick a destination and write the buffer there
  close             close the document
  status            path, state, language
  ls <dir>          list a directory
  mkdir <dir>       create a directory
  info              system info of the file service
  quit              leave (asks first if there are unsaved edits)";

pub fn execute(config: &QuireConfig, file: Option<&Path>) -> anyhow::Result<()> {
    let terminal = Arc::new(Terminal::stdio());
    let mut picker = TerminalPicker::new(Arc::clone(&terminal));
    if let Some(path) = file {
        picker = picker.preselect(path.to_path_buf());
    }
    let service = FileService::new(picker).with_filters(config.dialog.clone());
    let host = Arc::new(BridgeHost::new(service));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let (client, _host_task) = channel(host);
        let bridge: Arc<dyn FileBridge> = match config.request_timeout() {
            Some(limit) => Arc::new(TimeoutBridge::new(client, limit)),
            None => Arc::new(client),
        };
        let controller =
            SessionController::new(bridge, TerminalConfirmer::new(Arc::clone(&terminal)));
        let mut repl = Repl::new(controller, terminal);
        if file.is_some() {
            repl.execute("open").await?;
        }
        repl.run().await
    })
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl<B> {
    controller: SessionController<B>,
    terminal: Arc<Terminal>,
    changes: broadcast::Receiver<FileChanged>,
}

impl<B: FileBridge> Repl<B> {
    pub fn new(controller: SessionController<B>, terminal: Arc<Terminal>) -> Self {
        let changes = controller.subscribe_file_changed();
        Self {
            controller,
            terminal,
            changes,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &SessionController<B> {
        &self.controller
    }

    /// Read and execute commands until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.terminal.say("quire: type 'help' for commands")?;
        loop {
            self.report_changes()?;
            let prompt = format!("{} [{}]> ", self.controller.document().title(), self.controller.state());
            let Some(line) = self.terminal.prompt(&prompt)? else {
                if self.controller.is_dirty() {
                    tracing::warn!("input closed with unsaved edits");
                }
                return Ok(());
            };
            if self.execute(&line).await? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Execute one command line. Session errors are printed, not returned;
    /// only terminal I/O failures end the loop.
    pub async fn execute(&mut self, line: &str) -> anyhow::Result<Flow> {
        let line = line.trim();
        let (command, arg) = match line.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "help" => self.terminal.say(HELP)?,
            "open" => {
                let result = self.controller.open_requested().await;
                self.report_action(result, "opened")?;
            }
            "show" => self.show()?,
            "set" => {
                let state = self.controller.edit(arg);
                self.terminal.say(&format!("buffer replaced ({})", state))?;
            }
            "append" => {
                let mut content = self.controller.content();
                content.push_str(arg);
                content.push('\n');
                let state = self.controller.edit(content);
                self.terminal.say(&format!("line appended ({})", state))?;
            }
            "save" => {
                let result = self.controller.save_requested().await;
                self.report_action(result, "saved")?;
            }
            "save-as" => {
                let result = self.controller.save_as_requested().await;
                self.report_action(result, "saved")?;
            }
            "close" => {
                let result = self.controller.close_requested();
                self.report_action(result, "closed")?;
            }
            "status" => self.status()?,
            "ls" => {
                let response = self
                    .controller
                    .bridge()
                    .read_directory(dir_arg(arg))
                    .await;
                self.report_response(response)?;
            }
            "mkdir" => {
                if arg.is_empty() {
                    self.terminal.say("usage: mkdir <dir>")?;
                } else {
                    let response = self
                        .controller
                        .bridge()
                        .create_directory(PathBuf::from(arg))
                        .await;
                    self.report_response(response)?;
                }
            }
            "info" => {
                let response = self.controller.bridge().get_system_info().await;
                self.report_response(response)?;
            }
            "quit" | "exit" => match self.controller.close_requested() {
                Ok(ActionOutcome::Declined) => self.terminal.say("still open")?,
                Ok(_) => return Ok(Flow::Quit),
                Err(e) => self.terminal.say(&format!("error: {}", e))?,
            },
            other => self
                .terminal
                .say(&format!("unknown command '{}'; type 'help'", other))?,
        }
        Ok(Flow::Continue)
    }

    fn show(&self) -> anyhow::Result<()> {
        let doc = self.controller.document();
        self.terminal.say(&format!(
            "--- {} ({}) ---",
            doc.title(),
            language(doc.metadata().map(|m| m.file_extension.as_str()))
        ))?;
        self.terminal.say(doc.current().trim_end_matches('\n'))?;
        self.terminal.say("---")?;
        Ok(())
    }

    fn status(&self) -> anyhow::Result<()> {
        let doc = self.controller.document();
        let path = doc
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(untitled)".to_string());
        self.terminal.say(&format!("path:     {}", path))?;
        self.terminal
            .say(&format!("state:    {}", self.controller.state()))?;
        self.terminal.say(&format!(
            "language: {}",
            language(doc.metadata().map(|m| m.file_extension.as_str()))
        ))?;
        self.terminal
            .say(&format!("length:   {} bytes", doc.current().len()))?;
        if let Some(modified) = doc.metadata().and_then(|m| m.last_modified) {
            self.terminal
                .say(&format!("modified: {}", modified.to_rfc3339()))?;
        }
        Ok(())
    }

    fn report_action(
        &self,
        result: Result<ActionOutcome, SessionError>,
        done: &str,
    ) -> anyhow::Result<()> {
        let text = match result {
            Ok(ActionOutcome::Completed) => format!("{} {}", done, self.controller.document().title()),
            Ok(ActionOutcome::Cancelled { message }) => message,
            Ok(ActionOutcome::Declined) => "kept unsaved changes".to_string(),
            Err(e) => format!("error: {}", e),
        };
        self.terminal.say(&text)?;
        Ok(())
    }

    fn report_response(
        &self,
        response: Result<Response, quire_bridge::BridgeError>,
    ) -> anyhow::Result<()> {
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.terminal.say(&format!("error: {}", e))?;
                return Ok(());
            }
        };
        match response.outcome {
            Outcome::Success(Payload::Listing { items }) => {
                if items.is_empty() {
                    self.terminal.say("(empty)")?;
                }
                for item in items {
                    let marker = if item.is_directory { "d" } else { "-" };
                    self.terminal.say(&format!("{} {}", marker, item.name))?;
                }
            }
            Outcome::Success(Payload::DirectoryCreated) => {
                self.terminal.say("Directory created successfully")?
            }
            Outcome::Success(Payload::SystemInfo { info }) => {
                self.terminal.say(&serde_json::to_string_pretty(&info)?)?
            }
            Outcome::Success(other) => {
                self.terminal.say(&format!("unexpected reply: {:?}", other))?
            }
            Outcome::Cancelled { message } => self.terminal.say(&message)?,
            Outcome::Failure(failure) => self.terminal.say(&format!("error: {}", failure))?,
        }
        Ok(())
    }

    /// Print a line for each advisory change to the open document.
    fn report_changes(&mut self) -> anyhow::Result<()> {
        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    if self.controller.concerns_document(&change) {
                        self.terminal
                            .say(&format!("(file changed on disk: {})", change.path))?;
                    }
                }
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
            }
        }
    }
}

fn dir_arg(arg: &str) -> PathBuf {
    if arg.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(arg)
    }
}

fn language(extension: Option<&str>) -> &'static str {
    extension.map(language_for_extension).unwrap_or("plaintext")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::tests::scripted;
    use quire_bridge::ChannelClient;
    use tempfile::tempdir;

    async fn repl_with_input(input: &str) -> (Repl<ChannelClient>, crate::terminal::tests::SharedBuf) {
        let (terminal, out) = scripted(input);
        let service = FileService::new(TerminalPicker::new(Arc::clone(&terminal)));
        let (client, _task) = channel(Arc::new(BridgeHost::new(service)));
        let controller =
            SessionController::new(client, TerminalConfirmer::new(Arc::clone(&terminal)));
        (Repl::new(controller, terminal), out)
    }

    #[tokio::test]
    async fn open_edit_save_through_the_terminal() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.md");
        std::fs::write(&file, "hello").unwrap();

        let input = format!("open\n{}\nset hello!\nsave\nquit\n", file.display());
        let (mut repl, out) = repl_with_input(&input).await;
        repl.run().await.unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello!");
        let text = out.text();
        assert!(text.contains("opened notes.md"));
        assert!(text.contains("saved notes.md"));
        assert!(!repl.controller().is_dirty());
    }

    #[tokio::test]
    async fn quit_with_unsaved_edits_asks_first() {
        let (mut repl, out) = repl_with_input("set draft\nquit\nn\nquit\ny\n").await;
        repl.run().await.unwrap();
        let text = out.text();
        assert!(text.contains("untitled has unsaved changes"));
        assert!(text.contains("still open"));
        assert!(repl.controller().path().is_none());
    }

    #[tokio::test]
    async fn save_without_path_reports_error() {
        let (mut repl, out) = repl_with_input("set draft\n").await;
        repl.execute("set draft").await.unwrap();
        repl.execute("save").await.unwrap();
        assert!(out.text().contains("error: no active file path"));
    }

    #[tokio::test]
    async fn picker_cancel_is_reported() {
        let (mut repl, out) = repl_with_input("\n").await;
        repl.execute("open").await.unwrap();
        assert!(out.text().contains("No file selected"));
    }

    #[tokio::test]
    async fn ls_and_mkdir_go_through_the_bridge() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        let (mut repl, out) = repl_with_input("").await;

        let sub = dir.path().join("sub");
        repl.execute(&format!("mkdir {}", sub.display())).await.unwrap();
        repl.execute(&format!("ls {}", dir.path().display())).await.unwrap();

        assert!(sub.is_dir());
        let text = out.text();
        assert!(text.contains("Directory created successfully"));
        assert!(text.contains("- a.txt"));
        assert!(text.contains("d sub"));
    }

    #[tokio::test]
    async fn status_shows_language() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("main.rs");
        std::fs::write(&file, "fn main() {}").unwrap();
        let (mut repl, out) = repl_with_input(&format!("{}\n", file.display())).await;

        repl.execute("open").await.unwrap();
        repl.execute("status").await.unwrap();
        let text = out.text();
        assert!(text.contains("language: rust"));
        assert!(text.contains("state:    clean"));
    }

    #[tokio::test]
    async fn unknown_command_keeps_going() {
        let (mut repl, out) = repl_with_input("").await;
        assert_eq!(repl.execute("rm -rf /").await.unwrap(), Flow::Continue);
        assert!(out.text().contains("unknown command 'rm'"));
    }
}
