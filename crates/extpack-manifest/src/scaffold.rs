//! HTML pages generated for enabled UI features

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::ManifestError;
use crate::types::Feature;

/// Render the HTML page that hosts a feature's bundle
pub fn render_page(feature: Feature, title: &str) -> String {
    let script = format!("{}.js", feature.name());
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         \x20 <head>\n\
         \x20   <meta charset=\"utf-8\" />\n\
         \x20   <title>{title}</title>\n\
         \x20 </head>\n\
         \x20 <body>\n\
         \x20   <div id=\"__extpack\"></div>\n\
         \x20   <script src=\"./{script}\" type=\"module\"></script>\n\
         \x20 </body>\n\
         </html>\n",
        title = escape_html(title),
        script = script,
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Write the page for `feature` into `gen_dir`, skipping identical content
pub async fn write_page(
    gen_dir: &Path,
    feature: Feature,
    title: &str,
) -> Result<PathBuf, ManifestError> {
    tokio::fs::create_dir_all(gen_dir)
        .await
        .map_err(|e| ManifestError::io(gen_dir, e))?;

    let path = gen_dir.join(feature.page());
    let content = render_page(feature, title);

    match tokio::fs::read_to_string(&path).await {
        Ok(existing) if existing == content => {
            debug!("Scaffold up to date: {:?}", path);
            return Ok(path);
        }
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ManifestError::io(&path, err)),
    }

    tokio::fs::write(&path, content)
        .await
        .map_err(|e| ManifestError::io(&path, e))?;
    debug!("Scaffold written: {:?}", path);
    Ok(path)
}
