use std::path::PathBuf;

use fg_core::attributes::display_name;
use fg_core::{FaceId, FaceInput, FlowKind, Language, Text};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::attribute_listing;
use crate::events::{AppEvent, UiEvent};
use crate::state::AppState;

const HELP: &str = "\
Commands:
  faces                 list the bundled faces
  face <1-6>            use a bundled face
  upload <path>         use an image file
  clear-upload          drop the uploaded image
  prompt <text>         set the text prompt
  steps <10-50>         set the inference steps
  text                  generate a face from the prompt
  reset-prompt          clear the prompt and its generated face
  set <name> <0-100>    set an attribute (50 is neutral)
  reset                 reset every attribute
  attrs                 list attribute names
  generate              generate the edited face
  save [path]           save the edited face
  save-text [path]      save the face generated from text
  lang <en|vi>          switch language
  status                show the editor state
  help                  show this help
  quit                  leave";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Ui(UiEvent),
    Faces,
    Attributes,
    Status,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let ui = |event: UiEvent| -> Result<Option<ShellCommand>, String> { Ok(Some(ShellCommand::Ui(event))) };
    let path = || (!rest.is_empty()).then(|| PathBuf::from(rest));

    match word {
        "face" => {
            let id: u8 = rest.parse().map_err(|_| format!("face expects 1-{}", FaceId::COUNT))?;
            let face = FaceId::new(id).map_err(|e| e.to_string())?;
            ui(UiEvent::SelectDefaultFace(face))
        }
        "faces" => Ok(Some(ShellCommand::Faces)),
        "upload" => match path() {
            Some(path) => ui(UiEvent::UploadImage(path)),
            None => Err("upload expects a path".into()),
        },
        "clear-upload" => ui(UiEvent::ClearUpload),
        "prompt" => ui(UiEvent::SetPrompt(rest.to_string())),
        "steps" => {
            let steps = rest.parse().map_err(|_| "steps expects a number".to_string())?;
            ui(UiEvent::SetSteps(steps))
        }
        "text" => ui(UiEvent::GenerateFromText),
        "reset-prompt" => ui(UiEvent::ResetPrompt),
        "set" => {
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "set expects <name> <value>".to_string())?;
            let value = value
                .trim()
                .parse()
                .map_err(|_| "attribute values are integers".to_string())?;
            ui(UiEvent::SetAttribute { name: name.to_string(), value })
        }
        "reset" => ui(UiEvent::ResetAttributes),
        "attrs" => Ok(Some(ShellCommand::Attributes)),
        "generate" => ui(UiEvent::GenerateFace),
        "save" => ui(UiEvent::SaveResult { kind: FlowKind::FaceAttributes, path: path() }),
        "save-text" => ui(UiEvent::SaveResult { kind: FlowKind::TextToImage, path: path() }),
        "lang" => {
            let language: Language = rest.parse().map_err(|_| {
                let codes: Vec<&str> = Language::all().iter().map(Language::code).collect();
                format!("lang expects one of {}", codes.join(", "))
            })?;
            ui(UiEvent::SetLanguage(language))
        }
        "status" => Ok(Some(ShellCommand::Status)),
        "help" | "?" => Ok(Some(ShellCommand::Help)),
        "quit" | "exit" => Ok(Some(ShellCommand::Quit)),
        other => Err(format!("unknown command {other:?}, try `help`")),
    }
}

pub fn face_listing() -> String {
    FaceId::all()
        .map(|face| format!("  {}  {}\n", face.name(), face.asset()))
        .collect()
}

/// Everything the editor page would show, as text.
pub fn render_status(state: &AppState) -> String {
    let studio = &state.studio;
    let language = studio.language();
    let mut out = String::new();

    let input = match studio.selection().current() {
        None => Text::PlaceholderText.get(language).to_string(),
        Some(FaceInput::DefaultFace(face)) => face.name(),
        Some(FaceInput::Uploaded(image)) => format!("uploaded {}", image.filename()),
        Some(FaceInput::TextGenerated(image)) => format!(
            "generated from text at {} ({} bytes)",
            image.created_at().format("%H:%M:%S"),
            image.len()
        ),
    };
    out.push_str(&format!("input:  {input}\n"));
    out.push_str(&format!(
        "prompt: {:?} ({} steps)\n",
        studio.prompt().prompt(),
        studio.prompt().steps()
    ));

    let active = studio.active_attributes();
    if active.is_empty() {
        out.push_str(&format!("attrs:  {}\n", Text::DefaultAttributes.get(language)));
    } else {
        let summary: Vec<String> = active
            .iter()
            .map(|a| {
                let arrow = if a.is_raised() { "↑" } else { "↓" };
                format!("{} {}{}", display_name(a.name), arrow, a.value)
            })
            .collect();
        out.push_str(&format!("attrs:  {}\n", summary.join(", ")));
    }

    out.push_str(&state.flow_line(FlowKind::TextToImage));
    out.push('\n');
    out.push_str(&state.flow_line(FlowKind::FaceAttributes));
    out
}

pub async fn run(state: &mut AppState) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}\n");
    println!("{}", render_status(state));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(ShellCommand::Quit)) => break,
                    Ok(Some(command)) => execute(state, command).await,
                    Err(message) => eprintln!("{message}"),
                }
            }
            Some(update) = state.next_update() => {
                let kind = update.kind;
                if state.on_flow_update(update) {
                    println!("{}", state.flow_line(kind));
                }
            }
        }
    }

    state.shutdown();
    Ok(())
}

async fn execute(state: &mut AppState, command: ShellCommand) {
    match command {
        ShellCommand::Ui(event) => match state.on_ui_event(event).await {
            Ok(AppEvent::Updated) => println!("{}", render_status(state)),
            Ok(AppEvent::FlowStarted(kind)) => println!("{}", state.flow_line(kind)),
            Ok(AppEvent::FlowSkipped(FlowKind::TextToImage)) => println!("Enter a prompt first."),
            Ok(AppEvent::FlowSkipped(FlowKind::FaceAttributes)) => {
                println!("{}", Text::PlaceholderText.get(state.studio.language()))
            }
            Ok(AppEvent::ResultSaved(path)) => println!("Saved {}", path.display()),
            Err(e) => eprintln!("{e:#}"),
        },
        ShellCommand::Faces => print!("{}", face_listing()),
        ShellCommand::Attributes => print!("{}", attribute_listing(state.studio.language())),
        ShellCommand::Status => println!("{}", render_status(state)),
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fg_client::{ClientConfig, HttpFaceApi};

    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("face 3"),
            Ok(Some(ShellCommand::Ui(UiEvent::SelectDefaultFace(FaceId::new(3).unwrap()))))
        );
        assert_eq!(
            parse_command("prompt  a woman with red hair "),
            Ok(Some(ShellCommand::Ui(UiEvent::SetPrompt("a woman with red hair".into()))))
        );
        assert_eq!(
            parse_command("set Smiling 80"),
            Ok(Some(ShellCommand::Ui(UiEvent::SetAttribute { name: "Smiling".into(), value: 80 })))
        );
        assert_eq!(
            parse_command("save"),
            Ok(Some(ShellCommand::Ui(UiEvent::SaveResult { kind: FlowKind::FaceAttributes, path: None })))
        );
        assert_eq!(
            parse_command("lang vi"),
            Ok(Some(ShellCommand::Ui(UiEvent::SetLanguage(Language::Vi))))
        );
        assert_eq!(parse_command("faces"), Ok(Some(ShellCommand::Faces)));
        assert_eq!(parse_command("quit"), Ok(Some(ShellCommand::Quit)));
    }

    #[test]
    fn test_face_listing() {
        let listing = face_listing();
        assert_eq!(listing.lines().count(), usize::from(FaceId::COUNT));
        assert!(listing.contains("Face 6  images/face6.png"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("face 9").is_err());
        assert!(parse_command("face").is_err());
        assert!(parse_command("upload").is_err());
        assert!(parse_command("set Smiling").is_err());
        assert_eq!(parse_command("lang fr"), Err("lang expects one of en, vi".to_string()));
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test]
    async fn test_render_status() {
        let api = HttpFaceApi::new(ClientConfig::default()).unwrap();
        let mut state = AppState::new(Arc::new(api), &AppConfig::default());

        let text = render_status(&state);
        assert!(text.contains(Text::PlaceholderText.get(Language::En)));
        assert!(text.contains(Text::DefaultAttributes.get(Language::En)));

        state.on_ui_event(UiEvent::SelectDefaultFace(FaceId::new(1).unwrap())).await.unwrap();
        state
            .on_ui_event(UiEvent::SetAttribute { name: "Eyeglasses".into(), value: 100 })
            .await
            .unwrap();
        let text = render_status(&state);
        assert!(text.contains("Eyeglasses ↑100"), "{text}");
        assert!(!text.contains(Text::PlaceholderText.get(Language::En)));
    }
}
