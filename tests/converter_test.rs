//! Integration tests for the converter module.

use std::fs;
use std::path::{Path, PathBuf};

use mailprep::convert::{ConvertOptions, ConvertResult, HtmlConverter, OutputFormat};
use mailprep::{is_html_path, Error, TranscodeOptions, TranscodeStats};

fn fragment_converter() -> HtmlConverter {
    HtmlConverter::new(ConvertOptions::new().with_format(OutputFormat::Fragment))
}

#[test]
fn test_html_extensions() {
    assert!(is_html_path(Path::new("newsletter.html")));
    assert!(is_html_path(Path::new("legacy.HTM")));
    assert!(is_html_path(Path::new("export.xhtml")));
    assert!(!is_html_path(Path::new("message.eml")));
    assert!(!is_html_path(Path::new("noextension")));
}

#[test]
fn test_convert_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newsletter.html");
    fs::write(
        &path,
        "<p><img style=\"float:left;width:120px\" src=\"logo.png\">Welcome back</p>",
    )
    .unwrap();

    let result = fragment_converter().convert_file(&path).unwrap();

    assert_eq!(result.stats.layout_tables_built, 1);
    assert!(result.content.starts_with("<table"));
    assert!(result.content.contains("data-mailprep=\"layout\""));
    assert!(result.content.contains(">Welcome back</td>"));
    assert_eq!(result.mime_type, "text/html");
}

#[test]
fn test_convert_full_document_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.htm");
    fs::write(
        &path,
        "<!DOCTYPE html><html><head><title>x</title></head><body><h1>Hi</h1></body></html>",
    )
    .unwrap();

    let result = HtmlConverter::default().convert_file(&path).unwrap();
    assert!(result.content.contains("<h1 style=\"margin:0 0 0.5em 0;padding:0\">Hi</h1>"));
    assert_eq!(result.content.matches("<body").count(), 1);
}

#[test]
fn test_converted_output_converts_to_itself() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("draft.html");
    let second = dir.path().join("sent.html");
    fs::write(
        &first,
        "<p>Intro <img style=\"float:left;width:100px\" src=\"a.png\">Side</p>",
    )
    .unwrap();

    let converter = HtmlConverter::default();
    let once = converter.convert_file(&first).unwrap();
    fs::write(&second, &once.content).unwrap();
    let twice = converter.convert_file(&second).unwrap();

    assert_eq!(twice.content, once.content);
    assert_eq!(twice.stats.layout_tables_built, 0);
}

#[test]
fn test_convert_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = HtmlConverter::default().convert_file(&dir.path().join("absent.html"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_convert_rejects_other_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "<p>x</p>").unwrap();

    let result = HtmlConverter::default().convert_file(&path);
    assert!(matches!(result, Err(Error::Other(_))));
}

#[test]
fn test_convert_with_custom_options() {
    let options = ConvertOptions::new()
        .with_transcode_options(TranscodeOptions::default().with_min_font_size(14))
        .with_format(OutputFormat::Fragment);
    let result = HtmlConverter::new(options)
        .convert_bytes(b"<span style=\"font-size:12px\">x</span>")
        .unwrap();
    assert_eq!(result.content, "<span style=\"font-size:14px\">x</span>");
}

#[test]
fn test_format_overrides_template_switch() {
    let options = ConvertOptions::new()
        .with_transcode_options(TranscodeOptions::default().with_template(false))
        .with_format(OutputFormat::Html);
    let converter = HtmlConverter::new(options);
    assert_eq!(converter.format(), OutputFormat::Html);

    let result = converter.convert_str("<p>x</p>").unwrap();
    assert!(result.content.starts_with("<!DOCTYPE html"));
}

#[test]
fn test_convert_files_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..10)
        .map(|i| {
            let path = dir.path().join(format!("issue{:02}.html", i));
            fs::write(&path, format!("<p style=\"color:#fff\">issue {}</p>", i)).unwrap();
            path
        })
        .collect();

    let results = fragment_converter().convert_files(&paths, |_| {});

    assert_eq!(results.len(), 10);
    for (i, result) in results.into_iter().enumerate() {
        let result = result.unwrap();
        assert_eq!(result.stats.colors_rewritten, 1);
        assert!(result.content.contains(&format!(">issue {}</p>", i)));
    }
}

#[test]
fn test_convert_result_methods() {
    let result = ConvertResult::new("<p>x</p>".to_string(), TranscodeStats::default());

    assert_eq!(result.content_len(), 8);
    assert_eq!(result.stats.total_changes(), 0);
    assert_eq!(result.mime_type, "text/html");
}
