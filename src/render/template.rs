//! Document shell for mail clients.
//!
//! The shell carries the compatibility metadata that desktop and webmail
//! renderers look for, and puts the base typography on an outer wrapper
//! element instead of relying on `body` inheritance.

use super::serialize::escape_text;
use super::TranscodeOptions;

/// Value of the `generator` meta tag written into every shell.
pub const GENERATOR: &str = "mailprep";

/// Class of the outer wrapper holding the transcoded fragment.
pub const WRAPPER_CLASS: &str = "mailprep-wrapper";

const DOCTYPE: &str = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
                       \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">";

const HTML_OPEN: &str = "<html xmlns=\"http://www.w3.org/1999/xhtml\" \
                         xmlns:v=\"urn:schemas-microsoft-com:vml\" \
                         xmlns:o=\"urn:schemas-microsoft-com:office:office\">";

const MSO_SETTINGS: &str = "<!--[if mso]><xml><o:OfficeDocumentSettings><o:AllowPNG/>\
                            <o:PixelsPerInch>96</o:PixelsPerInch></o:OfficeDocumentSettings>\
                            </xml><![endif]-->";

const RESET_STYLE: &str = "<style type=\"text/css\">\
body{margin:0;padding:0;-webkit-text-size-adjust:100%;-ms-text-size-adjust:100%;}\
table,td{border-collapse:collapse;mso-table-lspace:0pt;mso-table-rspace:0pt;}\
img{border:0;outline:none;text-decoration:none;-ms-interpolation-mode:bicubic;}\
p{margin:0 0 1em 0;}\
</style>";

/// Wrap a transcoded fragment in a complete document.
///
/// # Example
///
/// ```
/// use mailprep::render::{wrap_document, TranscodeOptions};
///
/// let html = wrap_document("<p>Hi</p>", &TranscodeOptions::default());
/// assert!(html.starts_with("<!DOCTYPE html"));
/// assert!(html.contains("<p>Hi</p>"));
/// ```
pub fn wrap_document(fragment: &str, options: &TranscodeOptions) -> String {
    let font_size = options.default_font_size_px;
    let line_height = (font_size as f64 * 1.5).round() as u32;

    let mut title = String::new();
    escape_text(&options.title, &mut title);

    let mut font_family = String::new();
    for c in options.font_family.chars() {
        match c {
            '"' => font_family.push('\''),
            '<' | '>' | ';' => {}
            c => font_family.push(c),
        }
    }

    let mut out = String::with_capacity(fragment.len() + 1536);
    out.push_str(DOCTYPE);
    out.push('\n');
    out.push_str(HTML_OPEN);
    out.push_str("\n<head>\n");
    out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str("<meta http-equiv=\"X-UA-Compatible\" content=\"IE=edge\">\n");
    out.push_str("<meta name=\"x-apple-disable-message-reformatting\">\n");
    out.push_str(&format!("<meta name=\"generator\" content=\"{}\">\n", GENERATOR));
    out.push_str(&format!("<title>{}</title>\n", title));
    out.push_str(MSO_SETTINGS);
    out.push('\n');
    out.push_str(RESET_STYLE);
    out.push_str("\n</head>\n");
    out.push_str("<body style=\"margin:0;padding:0;\">\n");
    out.push_str(&format!(
        "<div class=\"{}\" style=\"font-family:{};font-size:{}px;line-height:{}px;\
         mso-line-height-rule:exactly;color:{};\">",
        WRAPPER_CLASS, font_family, font_size, line_height, options.replacement_text_color
    ));
    out.push_str(fragment);
    out.push_str("</div>\n</body>\n</html>\n");
    out
}
