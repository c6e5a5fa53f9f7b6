use std::path::PathBuf;

use fg_core::attributes::{display_name, DEFAULT_VALUE, MAX_VALUE};
use fg_core::{AttributeCategory, FaceId, FlowKind, FlowState, Language, Text};
use tracing::info;

use crate::cli::FaceArgs;
use crate::error::AppError;
use crate::events::{AppEvent, UiEvent};
use crate::state::AppState;

pub async fn prompt(state: &mut AppState, text: String, steps: u32, output: Option<PathBuf>) -> anyhow::Result<()> {
    generate_from_text(state, text, steps).await?;
    save(state, FlowKind::TextToImage, output).await
}

pub async fn face(state: &mut AppState, args: FaceArgs) -> anyhow::Result<()> {
    if let Some(id) = args.default {
        state
            .on_ui_event(UiEvent::SelectDefaultFace(FaceId::new(id)?))
            .await?;
    } else if let Some(path) = args.image {
        state.on_ui_event(UiEvent::UploadImage(path)).await?;
    } else if let Some(text) = args.prompt {
        generate_from_text(state, text, args.steps).await?;
    }

    for (name, value) in args.attrs {
        state.on_ui_event(UiEvent::SetAttribute { name, value }).await?;
    }

    let active = state.studio.active_attributes();
    info!("Generating with {} active attribute(s)", active.len());

    if state.on_ui_event(UiEvent::GenerateFace).await? == AppEvent::FlowSkipped(FlowKind::FaceAttributes) {
        return Err(AppError::NothingToGenerate("no input face").into());
    }
    finish(state, FlowKind::FaceAttributes).await?;
    save(state, FlowKind::FaceAttributes, args.output).await
}

async fn generate_from_text(state: &mut AppState, text: String, steps: u32) -> anyhow::Result<()> {
    state.on_ui_event(UiEvent::SetPrompt(text)).await?;
    state.on_ui_event(UiEvent::SetSteps(steps)).await?;

    if state.on_ui_event(UiEvent::GenerateFromText).await? == AppEvent::FlowSkipped(FlowKind::TextToImage) {
        return Err(AppError::NothingToGenerate("the prompt is empty").into());
    }
    finish(state, FlowKind::TextToImage).await
}

/// Wait for `kind`, echoing progress to stderr.
async fn finish(state: &mut AppState, kind: FlowKind) -> anyhow::Result<()> {
    let mut last = String::new();
    while state.studio.flow(kind).state().is_active() {
        let line = state.flow_line(kind);
        if line != last {
            eprintln!("{line}");
            last = line;
        }

        match state.next_update().await {
            Some(update) => {
                state.on_flow_update(update);
            }
            None => break,
        }
    }

    match state.studio.flow(kind).state() {
        FlowState::Succeeded(_) => Ok(()),
        FlowState::Failed(error) => Err(AppError::GenerationFailed(error.clone()).into()),
        other => Err(AppError::GenerationFailed(format!("{kind} flow stopped while {other:?}")).into()),
    }
}

async fn save(state: &mut AppState, kind: FlowKind, path: Option<PathBuf>) -> anyhow::Result<()> {
    if let AppEvent::ResultSaved(path) = state.on_ui_event(UiEvent::SaveResult { kind, path }).await? {
        println!("{}", path.display());
    }
    Ok(())
}

/// The attribute catalog grouped the way the editor shows it.
pub fn attribute_listing(language: Language) -> String {
    let mut out = String::new();
    for category in AttributeCategory::all() {
        out.push_str(Text::Category(category).get(language));
        out.push('\n');
        for name in category.members() {
            out.push_str(&format!("  {:<22} {}\n", name, display_name(name)));
        }
    }
    out.push_str(&format!("\nValues run from 0 to {MAX_VALUE}; {DEFAULT_VALUE} leaves an attribute unchanged.\n"));
    out
}
