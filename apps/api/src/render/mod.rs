// Document Filler: template instantiation into a new .docx per resume.
// Substitution is pure (substitute.rs); docx.rs maps it onto docx-rs objects.
// Load + fill + save is blocking work and runs inside tokio::task::spawn_blocking.

pub mod docx;
pub mod fields;
pub mod substitute;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::resume::GeneratedResume;
use crate::render::fields::TemplateData;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    TemplateMissing(PathBuf),

    #[error("template could not be read as a Word document: {0}")]
    Load(String),

    #[error("rendered document could not be written: {0}")]
    Save(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders generated resumes into copies of one template.
#[derive(Debug, Clone)]
pub struct DocumentFiller {
    template_path: PathBuf,
    output_dir: PathBuf,
}

impl DocumentFiller {
    pub fn new(template_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            template_path,
            output_dir,
        }
    }

    /// Fills the template with `resume` and returns the path of the new document.
    pub async fn fill(&self, resume: &GeneratedResume) -> Result<PathBuf, RenderError> {
        let data = TemplateData::from_resume(resume);
        let file_name = output_file_name(&resume.full_name);
        let template_path = self.template_path.clone();
        let output_dir = self.output_dir.clone();

        tokio::task::spawn_blocking(move || {
            fill_template(&template_path, &output_dir, &file_name, &data)
        })
        .await
        .map_err(|e| RenderError::Io(std::io::Error::other(e)))?
    }
}

/// `resume_<name>.docx` with whitespace as underscores. Path separators and
/// control characters are dropped so the name cannot leave the output directory.
pub fn output_file_name(full_name: &str) -> String {
    let name: String = full_name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    let name = if name.is_empty() { "user".to_string() } else { name };
    format!("resume_{name}.docx")
}

/// Loads the template, substitutes `data`, and publishes the result as
/// `output_dir/<render dir>/file_name`. Each call gets a fresh render
/// directory, so two subjects with the same name never share a file. Inside
/// it the document is written under a temporary name and renamed into place,
/// so readers never see a partial file.
pub fn fill_template(
    template_path: &Path,
    output_dir: &Path,
    file_name: &str,
    data: &TemplateData,
) -> Result<PathBuf, RenderError> {
    let bytes = std::fs::read(template_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RenderError::TemplateMissing(template_path.to_path_buf()),
        _ => RenderError::Io(e),
    })?;

    // The template on disk is never touched; all edits happen on this copy.
    let mut document = docx::load(&bytes)?;
    let rewritten = docx::fill(&mut document, data);

    std::fs::create_dir_all(output_dir)?;
    let render_dir = tempfile::Builder::new()
        .prefix("render-")
        .tempdir_in(output_dir)?
        .into_path();
    let mut staged = tempfile::NamedTempFile::new_in(&render_dir)?;
    docx::save(document, staged.as_file_mut())?;

    let output_path = render_dir.join(file_name);
    staged
        .persist(&output_path)
        .map_err(|e| RenderError::Io(e.error))?;

    info!(
        "Rendered {} ({} placeholder paragraphs)",
        output_path.display(),
        rewritten
    );
    Ok(output_path)
}
