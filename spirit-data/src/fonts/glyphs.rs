//! Glyph PBF generation.

use std::process::Command;

use camino::Utf8Path;
use log::debug;

use super::GlyphBuildError;

/// Converts a font file into a directory of glyph range PBFs.
pub trait GlyphBuilder {
    /// Write glyphs for `font` into the existing, empty `output_dir`.
    fn build(&self, font: &Utf8Path, output_dir: &Utf8Path) -> Result<(), GlyphBuildError>;
}

/// Runs an external tool as `<program> <args…> <font> <output_dir>`.
///
/// The default runs `npx -p fontnik build-glyphs`.
///
/// # Examples
/// ```
/// use spirit_data::fonts::CommandGlyphBuilder;
///
/// let builder = CommandGlyphBuilder::default();
/// assert_eq!(builder.program(), "npx");
/// let custom = CommandGlyphBuilder::new("build-glyphs", Vec::<String>::new());
/// assert_eq!(custom.program(), "build-glyphs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGlyphBuilder {
    program: String,
    args: Vec<String>,
}

impl CommandGlyphBuilder {
    /// Use `program` with leading `args`.
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Program that is run.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandGlyphBuilder {
    fn default() -> Self {
        Self::new("npx", ["-p", "fontnik", "build-glyphs"])
    }
}

impl GlyphBuilder for CommandGlyphBuilder {
    fn build(&self, font: &Utf8Path, output_dir: &Utf8Path) -> Result<(), GlyphBuildError> {
        debug!("running {} {:?} {font} {output_dir}", self.program, self.args);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(font.as_std_path())
            .arg(output_dir.as_std_path())
            .status()
            .map_err(|source| GlyphBuildError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(GlyphBuildError::Failed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn reports_failing_tools() {
        let builder = CommandGlyphBuilder::new("false", Vec::<String>::new());
        let err = builder
            .build(Utf8Path::new("font.ttf"), Utf8Path::new("out"))
            .expect_err("tool fails");
        assert!(matches!(err, GlyphBuildError::Failed { .. }));
    }

    #[rstest]
    fn reports_missing_tools() {
        let builder = CommandGlyphBuilder::new("spirit-no-such-glyph-tool", Vec::<String>::new());
        let err = builder
            .build(Utf8Path::new("font.ttf"), Utf8Path::new("out"))
            .expect_err("tool missing");
        assert!(matches!(err, GlyphBuildError::Spawn { .. }));
    }

    #[rstest]
    fn passes_font_and_directory_last() {
        let builder = CommandGlyphBuilder::new(
            "sh",
            ["-c", r#"test "$1" = font.ttf && test "$2" = out"#, "sh"],
        );
        builder
            .build(Utf8Path::new("font.ttf"), Utf8Path::new("out"))
            .expect("font and directory are the final arguments");
    }
}
