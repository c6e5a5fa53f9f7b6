use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use fg_core::Language;

#[derive(Debug, Parser)]
#[command(name = "facegen", version, about = "Generate and edit faces with semantic attributes")]
pub struct Cli {
    /// Base URL of the face generation service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Interface language (en, vi)
    #[arg(long, global = true)]
    pub lang: Option<Language>,

    /// Where results are saved when no explicit path is given
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a face from a text description
    Prompt {
        text: String,

        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(10..=50))]
        steps: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply attributes to a default, uploaded or text-generated face
    Face(FaceArgs),

    /// List every attribute by category
    Attributes,

    /// Interactive editor
    Shell,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["default", "image", "prompt"])))]
pub struct FaceArgs {
    /// One of the bundled faces (1-6)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
    pub default: Option<u8>,

    /// Image file to edit
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Generate the starting face from this description first
    #[arg(long)]
    pub prompt: Option<String>,

    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(10..=50))]
    pub steps: u32,

    /// Attribute value, e.g. `--attr Smiling=80` (0-100, 50 is neutral)
    #[arg(long = "attr", value_parser = parse_attr)]
    pub attrs: Vec<(String, i64)>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_attr(raw: &str) -> Result<(String, i64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("attribute value must be an integer, got {value:?}"))?;
    Ok((name.trim().to_string(), value))
}
