//! Ordered, non-empty set of recognition languages.

use std::fmt;

use super::OcrError;

/// Language identifiers handed to the engine, primary language first.
///
/// ```
/// use fieldscan::ocr::LanguageSet;
///
/// let langs = LanguageSet::new(["eng", "hin"]).unwrap();
/// assert_eq!(langs.primary(), "eng");
/// assert_eq!(langs.tesseract_spec(), "eng+hin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet(Vec<String>);

impl LanguageSet {
    /// Trim, drop blanks and duplicates (first occurrence wins).
    ///
    /// # Errors
    ///
    /// [`OcrError::NoLanguages`] when nothing is left.
    pub fn new<I, S>(languages: I) -> Result<Self, OcrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for lang in languages {
            let lang = lang.as_ref().trim();
            if !lang.is_empty() && !out.iter().any(|l| l == lang) {
                out.push(lang.to_string());
            }
        }
        if out.is_empty() {
            return Err(OcrError::NoLanguages);
        }
        Ok(Self(out))
    }

    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// `-l` argument for tesseract (`eng+hin`).
    pub fn tesseract_spec(&self) -> String {
        self.0.join("+")
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self(vec!["eng".into(), "hin".into()])
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tesseract_spec())
    }
}
