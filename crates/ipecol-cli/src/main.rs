//! `ipecol` command-line tool.

mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ipecol::template::walk_template_dir;
use ipecol::{
    Documentation, ExampleGenerator, HintsTable, RendererConfig, TemplateEngine,
    TemplateRegistry,
};
use log::{info, warn};

use cli::{Cli, Command, GenerateDocArgs};

/// Extension of Ipe stylesheet files.
const STYLESHEET_EXTENSION: &str = "isy";

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let result = match &cli.command {
        Command::GenerateDoc(args) => generate_doc(args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn is_stylesheet(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(STYLESHEET_EXTENSION))
}

fn load_engine(templates: Option<&Path>) -> Result<TemplateEngine> {
    let mut registry = TemplateRegistry::with_builtins();
    if let Some(dir) = templates {
        let files = walk_template_dir(dir)
            .with_context(|| format!("failed to read template directory {}", dir.display()))?;
        registry.add_from_files(files)?;
    }
    Ok(TemplateEngine::from_registry(&registry)?)
}

/// Returns `Ok(false)` when any stylesheet or item failed; the document is
/// still written with everything that succeeded.
fn generate_doc(args: &GenerateDocArgs) -> Result<bool> {
    let hints = args
        .hints
        .as_deref()
        .map(HintsTable::from_path)
        .transpose()
        .context("invalid hints file")?;

    let engine = Arc::new(load_engine(args.templates.as_deref())?);
    let config = RendererConfig {
        program: args.renderer.clone(),
        keep_document: args.keep_document,
    };
    let mut generator = ExampleGenerator::from_config(Arc::clone(&engine), &config);
    if let Some(hints) = hints {
        generator = generator.with_hints(hints);
    }

    let image_root = args.image_root();
    let mut docs = Documentation::new();
    let mut ok = true;

    for path in &args.stylefiles {
        if !is_stylesheet(path) {
            warn!("skipping {}: not a .{} file", path.display(), STYLESHEET_EXTENSION);
            continue;
        }
        match docs.add_stylesheet(path, &generator, &image_root) {
            Ok(failures) => {
                for failure in &failures {
                    eprintln!("{}: {}", path.display(), failure);
                }
                ok &= failures.is_empty();
            }
            Err(err) => {
                eprintln!("error: {:#}", anyhow::Error::new(err));
                ok = false;
            }
        }
    }

    if let Some(base) = &args.image_base {
        docs.rebase_images(base)
            .with_context(|| format!("failed to rebase images to {}", base.display()))?;
    }

    docs.save_markdown(&engine, &args.output)?;
    info!(
        "wrote {} ({} stylesheets)",
        args.output.display(),
        docs.docs().len()
    );
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stylesheet() {
        assert!(is_stylesheet(Path::new("styles/basic.isy")));
        assert!(is_stylesheet(Path::new("BASIC.ISY")));
        assert!(!is_stylesheet(Path::new("basic.ipe")));
        assert!(!is_stylesheet(Path::new("isy")));
    }

    #[test]
    fn test_template_override_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("color.jinja2"), "<custom name=\"{{ name }}\"/>").unwrap();

        let engine = load_engine(Some(dir.path())).unwrap();
        let options = ipecol::IpeOptions::default();
        let fragment = engine
            .render_fragment(
                "color",
                &ipecol::FragmentRequest::new(ipecol::StyleKind::Color, "red", &options),
            )
            .unwrap();
        assert_eq!(fragment, "<custom name=\"red\"/>");
        assert!(engine.has_template("mark"));
    }

    #[test]
    fn test_missing_template_directory() {
        assert!(load_engine(Some(Path::new("/no/such/templates"))).is_err());
    }

    #[test]
    fn test_generate_doc_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("styles.md");
        let args = GenerateDocArgs {
            stylefiles: vec![dir.path().join("notes.txt")],
            output: output.clone(),
            images: None,
            hints: None,
            templates: None,
            renderer: "iperender".into(),
            keep_document: false,
            image_base: None,
        };
        assert!(generate_doc(&args).unwrap());
        assert_eq!(std::fs::read_to_string(output).unwrap(), "");
    }
}
