//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use ipecol::render::DEFAULT_RENDERER;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "ipecol", version, about = "Render Ipe stylesheet examples into Markdown documentation")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render examples for stylesheets and write a Markdown document.
    GenerateDoc(GenerateDocArgs),
}

#[derive(Debug, Args)]
pub struct GenerateDocArgs {
    /// Stylesheets to document (.isy)
    #[arg(required = true, value_name = "STYLEFILES")]
    pub stylefiles: Vec<PathBuf>,

    /// Markdown file to write
    #[arg(short, long, value_name = "MDFILE")]
    pub output: PathBuf,

    /// Render root for images [default: images/ next to MDFILE]
    #[arg(long, value_name = "DIR")]
    pub images: Option<PathBuf>,

    /// Hints file (YAML, or JSON with a .json extension)
    #[arg(long, value_name = "FILE")]
    pub hints: Option<PathBuf>,

    /// Directory of templates overriding the built-in ones
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// External renderer program
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_RENDERER)]
    pub renderer: PathBuf,

    /// Keep the composite render documents next to the images
    #[arg(long)]
    pub keep_document: bool,

    /// Reference images from this directory in the emitted document
    #[arg(long, value_name = "DIR")]
    pub image_base: Option<PathBuf>,
}

impl GenerateDocArgs {
    /// Where images are rendered.
    pub fn image_root(&self) -> PathBuf {
        match &self.images {
            Some(dir) => dir.clone(),
            None => self
                .output
                .parent()
                .map(|p| p.join("images"))
                .unwrap_or_else(|| PathBuf::from("images")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("ipecol").chain(args.iter().copied()))
    }

    #[test]
    fn test_generate_doc_defaults() {
        let cli = parse(&["generate-doc", "basic.isy", "--output", "docs/styles.md"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Warn);
        let Command::GenerateDoc(args) = cli.command;
        assert_eq!(args.stylefiles, vec![PathBuf::from("basic.isy")]);
        assert_eq!(args.renderer, PathBuf::from("iperender"));
        assert!(!args.keep_document);
        assert_eq!(args.image_root(), PathBuf::from("docs/images"));
    }

    #[test]
    fn test_generate_doc_options() {
        let cli = parse(&[
            "-vv",
            "generate-doc",
            "a.isy",
            "b.isy",
            "-o",
            "styles.md",
            "--images",
            "out",
            "--hints",
            "hints.yaml",
            "--renderer",
            "/opt/ipe/bin/iperender",
            "--keep-document",
            "--image-base",
            "fixtures",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        let Command::GenerateDoc(args) = cli.command;
        assert_eq!(args.stylefiles.len(), 2);
        assert_eq!(args.image_root(), PathBuf::from("out"));
        assert_eq!(args.hints, Some(PathBuf::from("hints.yaml")));
        assert!(args.keep_document);
        assert_eq!(args.image_base, Some(PathBuf::from("fixtures")));
    }

    #[test]
    fn test_stylefiles_required() {
        assert!(parse(&["generate-doc", "--output", "styles.md"]).is_err());
        assert!(parse(&["generate-doc", "basic.isy"]).is_err());
    }

    #[test]
    fn test_output_without_directory() {
        let cli = parse(&["generate-doc", "basic.isy", "-o", "styles.md"]).unwrap();
        let Command::GenerateDoc(args) = cli.command;
        assert_eq!(args.image_root(), PathBuf::from("images"));
    }
}
