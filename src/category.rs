//! Extension and category classification
//!
//! Maps a file name to its lowercase extension and the extension to a coarse
//! category through a static table. Every function here is total: unknown
//! extensions fall into [`Category::Other`].

use std::fmt;

use serde::Serialize;

/// Folder reported for files that live at the root of a scope
pub const ROOT_FOLDER: &str = "/";

/// Coarse content classification derived from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// pdf, doc, docx, txt, rtf, odt, md
    Document,
    /// xls, xlsx, csv, ods
    Spreadsheet,
    /// ppt, pptx, odp
    Presentation,
    /// jpg, png, gif, svg and friends
    Image,
    /// mp4, avi, mov, mkv, webm
    Video,
    /// mp3, wav, ogg, flac, aac
    Audio,
    /// zip, tar, gz, rar, 7z
    Archive,
    /// Source and markup files
    Code,
    /// Anything not in the table
    Other,
}

/// Static extension table, keyed by lowercase extension without the dot
const EXTENSION_TABLE: &[(&str, Category)] = &[
    // Documents
    ("pdf", Category::Document),
    ("doc", Category::Document),
    ("docx", Category::Document),
    ("txt", Category::Document),
    ("rtf", Category::Document),
    ("odt", Category::Document),
    ("md", Category::Document),
    // Spreadsheets
    ("xls", Category::Spreadsheet),
    ("xlsx", Category::Spreadsheet),
    ("csv", Category::Spreadsheet),
    ("ods", Category::Spreadsheet),
    // Presentations
    ("ppt", Category::Presentation),
    ("pptx", Category::Presentation),
    ("odp", Category::Presentation),
    // Images
    ("jpg", Category::Image),
    ("jpeg", Category::Image),
    ("png", Category::Image),
    ("gif", Category::Image),
    ("webp", Category::Image),
    ("svg", Category::Image),
    ("bmp", Category::Image),
    ("ico", Category::Image),
    ("tiff", Category::Image),
    // Videos
    ("mp4", Category::Video),
    ("avi", Category::Video),
    ("mov", Category::Video),
    ("mkv", Category::Video),
    ("webm", Category::Video),
    // Audio
    ("mp3", Category::Audio),
    ("wav", Category::Audio),
    ("ogg", Category::Audio),
    ("flac", Category::Audio),
    ("aac", Category::Audio),
    // Archives
    ("zip", Category::Archive),
    ("tar", Category::Archive),
    ("gz", Category::Archive),
    ("rar", Category::Archive),
    ("7z", Category::Archive),
    // Code
    ("js", Category::Code),
    ("ts", Category::Code),
    ("py", Category::Code),
    ("java", Category::Code),
    ("html", Category::Code),
    ("css", Category::Code),
    ("json", Category::Code),
    ("xml", Category::Code),
    ("yaml", Category::Code),
    ("yml", Category::Code),
];

impl Category {
    /// Look up the category of a lowercase extension
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        EXTENSION_TABLE
            .iter()
            .find(|(known, _)| *known == ext)
            .map_or(Self::Other, |&(_, category)| category)
    }

    /// Lowercase name used in reasons and content type filters
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Archive => "archive",
            Self::Code => "code",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase substring after the last `.` of `name`, or `""` if there is none
#[must_use]
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()).unwrap_or_default()
}

/// `path` with its final segment removed, or [`ROOT_FOLDER`] at the root
#[must_use]
pub fn folder_of(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((folder, _)) if !folder.is_empty() => folder,
        _ => ROOT_FOLDER,
    }
}

/// Final `/`-delimited segment of `path`
#[must_use]
pub fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension of `name` together with its category
#[must_use]
pub fn classify(name: &str) -> (String, Category) {
    let ext = extension_of(name);
    let category = Category::from_extension(&ext);
    (ext, category)
}
