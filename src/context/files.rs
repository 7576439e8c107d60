use minijinja::Environment;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Content type for a file, guessed from its extension
pub fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

/// Render a template file with minijinja
pub fn render_template<S: Serialize + ?Sized>(path: &Path, data: &S) -> io::Result<String> {
    render_templates(&[path], data, |_| {})
}

/// Render a set of template files, executing the first one
///
/// Every file is registered under its file name, so the first template can
/// `extends` or `include` the others (`{% extends "layout.html" %}`).
/// `configure` runs before rendering and is where custom filters and
/// functions are added.
pub fn render_templates<P, S, F>(paths: &[P], data: &S, configure: F) -> io::Result<String>
where
    P: AsRef<Path>,
    S: Serialize + ?Sized,
    F: FnOnce(&mut Environment<'_>),
{
    let Some(entry) = paths.first() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no template files given",
        ));
    };
    let sources = paths
        .iter()
        .map(|p| {
            let p = p.as_ref();
            fs::read_to_string(p).map(|source| (template_name(p), source))
        })
        .collect::<io::Result<Vec<_>>>()?;

    let mut env = Environment::new();
    for (name, source) in &sources {
        env.add_template(name, source).map_err(io::Error::other)?;
    }
    configure(&mut env);
    let tmpl = env
        .get_template(&template_name(entry.as_ref()))
        .map_err(io::Error::other)?;
    tmpl.render(data).map_err(io::Error::other)
}

fn template_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
