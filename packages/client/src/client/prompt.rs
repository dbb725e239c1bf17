//! Line-oriented input: parse prompt lines into session commands.
//!
//! rustyline is blocking, so the prompt runs on its own thread and hands
//! commands to the session loop over a channel.

use std::io::Write;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use super::formatter::MessageFormatter;
use crate::domain::{Confirmation, FileKind};
use crate::session::{Command, View};

/// What a prompt line means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    Command(Command),
    /// `/kick` needs an explicit confirmation before it becomes a command
    Kick(String),
    Help,
    Empty,
    Invalid(String),
}

/// Parse one line typed at the room prompt.
pub fn parse_line(line: &str) -> PromptInput {
    let line = line.trim();
    if line.is_empty() {
        return PromptInput::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return PromptInput::Command(Command::SendChat(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match (name, args) {
        ("help", _) => return PromptInput::Help,
        ("open", path) if !path.is_empty() => Command::Open(path.to_string()),
        ("cat", _) => Command::Show(View::OpenFile),
        ("line", args) => match parse_line_edit(args) {
            Some((line, text)) => Command::EditLine { line, text },
            None => return PromptInput::Invalid("usage: /line N TEXT".to_string()),
        },
        ("cursor", n) => match parse_line_number(n) {
            Some(line) => Command::MoveCursor(line),
            None => return PromptInput::Invalid("usage: /cursor N".to_string()),
        },
        ("new", path) if !path.is_empty() => Command::CreateFile {
            path: path.to_string(),
            kind: FileKind::File,
        },
        ("mkdir", path) if !path.is_empty() => Command::CreateFile {
            path: path.to_string(),
            kind: FileKind::Folder,
        },
        ("rm", path) if !path.is_empty() => Command::DeleteFile(path.to_string()),
        ("tree", _) => Command::Show(View::Tree),
        ("share", "on") => Command::SetSharing(true),
        ("share", "off") => Command::SetSharing(false),
        ("share", _) => return PromptInput::Invalid("usage: /share on|off".to_string()),
        ("chat", _) => Command::FocusChat,
        ("close", _) => Command::HideChat,
        ("who", _) => Command::Show(View::Participants),
        ("kick", target) if !target.is_empty() => return PromptInput::Kick(target.to_string()),
        ("run", _) => Command::Run,
        ("preview", _) => Command::Show(View::Preview),
        ("console", _) => Command::Show(View::Console),
        ("activity", _) => Command::Show(View::Activity),
        ("mic", _) => Command::ToggleMic,
        ("quit", _) | ("exit", _) => Command::Leave,
        ("open" | "new" | "mkdir" | "rm", _) => {
            return PromptInput::Invalid(format!("usage: /{} PATH", name));
        }
        ("kick", _) => return PromptInput::Invalid("usage: /kick NAME".to_string()),
        _ => return PromptInput::Invalid(format!("unknown command '/{}' (try /help)", name)),
    };
    PromptInput::Command(command)
}

fn parse_line_number(text: &str) -> Option<u32> {
    text.parse::<u32>().ok().filter(|line| *line >= 1)
}

fn parse_line_edit(args: &str) -> Option<(u32, String)> {
    let (number, text) = match args.split_once(' ') {
        Some((number, text)) => (number, text),
        None => (args, ""),
    };
    Some((parse_line_number(number)?, text.to_string()))
}

/// Only an explicit yes confirms.
pub fn parse_confirmation(answer: &str) -> Confirmation {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Declined,
    }
}

/// Redisplay the prompt after asynchronous output
pub fn redisplay_prompt(username: &str) {
    print!("{}> ", username);
    std::io::stdout().flush().ok();
}

/// Read lines on a dedicated thread until EOF, Ctrl+C, `/quit` or the session goes away.
pub fn spawn_prompt(
    username: String,
    commands: mpsc::UnboundedSender<Command>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };
        let prompt = format!("{}> ", username);

        loop {
            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            };
            if !line.trim().is_empty() {
                rl.add_history_entry(line.as_str()).ok();
            }

            let command = match parse_line(&line) {
                PromptInput::Command(command) => command,
                PromptInput::Kick(target) => {
                    let question = format!("Remove {} from the room? [y/N] ", target);
                    let confirmation = match rl.readline(&question) {
                        Ok(answer) => parse_confirmation(&answer),
                        Err(_) => Confirmation::Declined,
                    };
                    Command::Kick {
                        target,
                        confirmation,
                    }
                }
                PromptInput::Help => {
                    println!("{}", MessageFormatter::format_help());
                    continue;
                }
                PromptInput::Empty => continue,
                PromptInput::Invalid(message) => {
                    println!("{}", message);
                    continue;
                }
            };

            let leaving = command == Command::Leave;
            if commands.send(command).is_err() || leaving {
                break;
            }
        }
        // Dropping the sender tells the session loop to leave
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        // テスト項目: スラッシュで始まらない入力はチャット送信になる
        // given (前提条件):
        let line = "  hello there ";

        // when (操作):
        let input = parse_line(line);

        // then (期待する結果):
        assert_eq!(
            input,
            PromptInput::Command(Command::SendChat("hello there".to_string()))
        );
    }

    #[test]
    fn test_parse_file_commands() {
        // テスト項目: ファイル操作コマンドが解析される
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(
            parse_line("/open src/app.js"),
            PromptInput::Command(Command::Open("src/app.js".to_string()))
        );
        assert_eq!(
            parse_line("/mkdir src/lib"),
            PromptInput::Command(Command::CreateFile {
                path: "src/lib".to_string(),
                kind: FileKind::Folder
            })
        );
        assert_eq!(
            parse_line("/rm src"),
            PromptInput::Command(Command::DeleteFile("src".to_string()))
        );
        assert!(matches!(parse_line("/new"), PromptInput::Invalid(_)));
    }

    #[test]
    fn test_parse_line_edit_keeps_inner_spacing() {
        // テスト項目: /line は行番号以降のテキストをそのまま保持する
        // given (前提条件):
        let line = "/line 3 let  x = 1;";

        // when (操作):
        let input = parse_line(line);

        // then (期待する結果):
        assert_eq!(
            input,
            PromptInput::Command(Command::EditLine {
                line: 3,
                text: "let  x = 1;".to_string()
            })
        );
    }

    #[test]
    fn test_parse_line_edit_rejects_bad_numbers() {
        // テスト項目: 行番号が 0 や数値でない場合はエラーになる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!(matches!(parse_line("/line 0 x"), PromptInput::Invalid(_)));
        assert!(matches!(parse_line("/line x"), PromptInput::Invalid(_)));
        assert!(matches!(parse_line("/cursor -1"), PromptInput::Invalid(_)));
    }

    #[test]
    fn test_kick_requires_confirmation_step() {
        // テスト項目: /kick は確認待ちの入力として返される
        // given (前提条件):
        let line = "/kick alice";

        // when (操作):
        let input = parse_line(line);

        // then (期待する結果):
        assert_eq!(input, PromptInput::Kick("alice".to_string()));
    }

    #[test]
    fn test_parse_confirmation_defaults_to_declined() {
        // テスト項目: y / yes 以外の回答は拒否として扱われる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(parse_confirmation("y"), Confirmation::Confirmed);
        assert_eq!(parse_confirmation(" YES "), Confirmation::Confirmed);
        assert_eq!(parse_confirmation(""), Confirmation::Declined);
        assert_eq!(parse_confirmation("n"), Confirmation::Declined);
    }

    #[test]
    fn test_share_toggle_and_unknown_command() {
        // テスト項目: /share on|off が解析され、未知のコマンドはエラーになる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(
            parse_line("/share off"),
            PromptInput::Command(Command::SetSharing(false))
        );
        assert!(matches!(parse_line("/share maybe"), PromptInput::Invalid(_)));
        assert!(matches!(parse_line("/dance"), PromptInput::Invalid(_)));
        assert_eq!(parse_line("/close"), PromptInput::Command(Command::HideChat));
        assert_eq!(parse_line("/help"), PromptInput::Help);
        assert_eq!(parse_line("   "), PromptInput::Empty);
    }
}
